//! Reward payout types and the delay-based confidence rating

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TransferRecord;

/// Delays at or below this many blocks rate `High`
pub const HIGH_CONFIDENCE_MAX_DELAY: u64 = 5;

/// Delays at or below this many blocks (and above the high bound) rate `Medium`
pub const MEDIUM_CONFIDENCE_MAX_DELAY: u64 = 20;

/// Coarse trust rating for a delay-based purchase/payout match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Pure function of delay: `<= 5` high, `<= 20` medium, otherwise low
    pub fn from_delay(delay_blocks: u64) -> Self {
        if delay_blocks <= HIGH_CONFIDENCE_MAX_DELAY {
            ConfidenceTier::High
        } else if delay_blocks <= MEDIUM_CONFIDENCE_MAX_DELAY {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One token paid out within the reward transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayout {
    pub token_symbol: String,
    pub token_address: String,
    pub amount: f64,
    pub raw_amount: String,
    pub decimals: Option<u32>,
}

impl From<&TransferRecord> for TokenPayout {
    fn from(transfer: &TransferRecord) -> Self {
        Self {
            token_symbol: transfer
                .token_symbol
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            token_address: transfer.token_address.clone(),
            amount: transfer.amount(),
            raw_amount: transfer.raw_amount.clone(),
            decimals: transfer.decimals,
        }
    }
}

/// The payout matched to a purchase
///
/// Only constructible through [`RewardResult::from_payout_transfers`], which
/// guarantees `delay_blocks >= 1` and a non-empty token list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub reward_tx_hash: String,
    pub reward_block: u64,
    pub delay_blocks: u64,
    pub reward_tokens: Vec<TokenPayout>,
    pub confidence: ConfidenceTier,
}

impl RewardResult {
    /// Fold the transfers of a single payout transaction into a result
    ///
    /// `reward_block` is the minimum block among the transfers. Returns `None`
    /// when there are no transfers or the payout does not land strictly after
    /// `buy_block`.
    pub fn from_payout_transfers(
        reward_tx_hash: &str,
        buy_block: u64,
        transfers: &[&TransferRecord],
    ) -> Option<Self> {
        let reward_block = transfers.iter().map(|t| t.block_number).min()?;
        if reward_block <= buy_block {
            return None;
        }
        let delay_blocks = reward_block - buy_block;

        Some(Self {
            reward_tx_hash: reward_tx_hash.to_string(),
            reward_block,
            delay_blocks,
            reward_tokens: transfers.iter().map(|t| TokenPayout::from(*t)).collect(),
            confidence: ConfidenceTier::from_delay(delay_blocks),
        })
    }
}
