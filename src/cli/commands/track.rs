use super::ConfigOverrides;
use crate::cli::output::render_pack_json;
use crate::errors::AppResult;
use crate::explorer::ExplorerClient;
use crate::processor::Correlator;
use crate::utils::hex_input::{parse_address, parse_tx_hash};
use clap::Args;
use tracing::info;

/// Classify one known purchase and attach its reward payout
#[derive(Args)]
pub struct TrackCommand {
    /// Purchase transaction hash
    #[arg(long)]
    pub tx: String,

    /// Buyer address
    #[arg(long)]
    pub buyer: String,

    /// Block height of the purchase
    #[arg(long)]
    pub block: u64,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl TrackCommand {
    pub async fn run(&self) -> AppResult<()> {
        // Validate before any request is made
        let tx_hash = parse_tx_hash(&self.tx)?;
        let buyer = parse_address(&self.buyer)?;

        let app_config = self.overrides.resolve()?;
        let client = ExplorerClient::new(app_config.explorer)?;
        let correlator = Correlator::new(client, app_config.tracker);

        info!("Tracking purchase {} by {} at block {}", tx_hash, buyer, self.block);
        let pack = correlator.process_purchase(&tx_hash, &buyer, self.block).await?;

        println!("{}", render_pack_json(&pack)?);
        if pack.reward.is_none() {
            eprintln!(
                "Reward not found within {} blocks of the purchase",
                correlator.config().lookahead_blocks
            );
        }

        let stats = correlator.api().stats();
        info!(
            "Explorer requests: {} ({} retries)",
            stats.requests_sent, stats.retries
        );
        Ok(())
    }
}
