use super::ConfigOverrides;
use crate::errors::{AppError, AppResult};
use crate::explorer::{ExplorerApi, ExplorerClient};
use clap::Args;
use tracing::{error, info};

/// Check explorer connectivity by asking for the head block
#[derive(Args)]
pub struct TestExplorerCommand {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl TestExplorerCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing Explorer Connection ===");
        let app_config = self.overrides.resolve()?;
        let client = ExplorerClient::new(app_config.explorer.clone())?;

        info!("Testing connection to: {}", app_config.explorer.base_url);

        match client.latest_block().await {
            Ok(Some(height)) => {
                println!("Explorer connection test PASSED");
                println!("Head block: {}", height);
                Ok(())
            }
            Ok(None) => {
                println!("Explorer reachable but returned no head block");
                println!("Check that the API supports module=block&action=eth_block_number");
                Err(AppError::Config(
                    "Explorer did not report a head block".to_string(),
                ))
            }
            Err(e) => {
                error!("Explorer connection test failed: {}", e);
                println!("Explorer connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Verify the explorer base URL is correct");
                println!("2. Check network access to the explorer");
                println!("3. Raise --courtesy-delay-ms if the explorer is rate limiting");
                Err(e.into())
            }
        }
    }
}
