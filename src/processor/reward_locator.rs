//! Reward payout lookup
//!
//! Issues one bounded range query for transfers sent by the target contract in
//! `[buy_block + 1, buy_block + lookahead]` and folds the first payout
//! transaction addressed to the buyer into a [`RewardResult`].

use tracing::debug;

use crate::config::TrackerConfig;
use crate::errors::ExplorerResult;
use crate::explorer::{AddressTransferQuery, ExplorerApi};
use crate::types::{normalise_address, RewardResult, TransferRecord};

pub struct RewardLocator {
    target_contract: String,
    lookahead_blocks: u64,
}

impl RewardLocator {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            target_contract: normalise_address(&config.target_contract),
            lookahead_blocks: config.lookahead_blocks,
        }
    }

    /// Inclusive block window searched for a payout
    pub fn window(&self, buy_block: u64) -> (u64, u64) {
        (
            buy_block.saturating_add(1),
            buy_block.saturating_add(self.lookahead_blocks),
        )
    }

    /// Find the payout for `buyer` after `buy_block`, if one landed in the window
    pub async fn locate_reward<A: ExplorerApi>(
        &self,
        api: &A,
        buyer: &str,
        buy_block: u64,
    ) -> ExplorerResult<Option<RewardResult>> {
        let (start, end) = self.window(buy_block);
        let query = AddressTransferQuery::block_range(&self.target_contract, start, end);
        let transfers = api.address_transfers(&query).await?;

        let reward = self.select_payout(&transfers, buyer, buy_block);
        match &reward {
            Some(r) => debug!(
                "Reward for {} at block {}: {} (+{} blocks, {} tokens)",
                buyer,
                buy_block,
                r.reward_tx_hash,
                r.delay_blocks,
                r.reward_tokens.len()
            ),
            None => debug!(
                "No reward for {} in blocks {}..={} ({} transfers scanned)",
                buyer,
                start,
                end,
                transfers.len()
            ),
        }
        Ok(reward)
    }

    /// Pick the payout from transfers already fetched for the window
    ///
    /// Keeps transfers from the target contract to `buyer` that carry a token
    /// address and fall inside the window, then takes the first transaction hash
    /// in upstream order. Later payout transactions are ignored.
    pub fn select_payout(
        &self,
        transfers: &[TransferRecord],
        buyer: &str,
        buy_block: u64,
    ) -> Option<RewardResult> {
        let buyer = normalise_address(buyer);
        let (start, end) = self.window(buy_block);

        let payouts: Vec<&TransferRecord> = transfers
            .iter()
            .filter(|t| t.to == buyer && !t.token_address.is_empty())
            .filter(|t| t.from.is_empty() || t.from == self.target_contract)
            .filter(|t| (start..=end).contains(&t.block_number))
            .collect();

        let payout_tx = payouts.first()?.tx_hash.clone();
        let grouped: Vec<&TransferRecord> = payouts
            .into_iter()
            .filter(|t| t.tx_hash == payout_tx)
            .collect();

        RewardResult::from_payout_transfers(&payout_tx, buy_block, &grouped)
    }
}
