//! Subcommand implementations and the configuration plumbing they share

pub mod scan;
pub mod test_explorer;
pub mod track;

use crate::config::{AppConfig, ClassificationMode};
use crate::errors::{AppError, AppResult};
use clap::Args;
use tracing::{info, warn};

/// Explorer/tracker overrides accepted by every subcommand
#[derive(Args, Clone, Default)]
pub struct ConfigOverrides {
    /// Explorer API base URL (overrides config.toml)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Courtesy delay before each request in milliseconds (overrides config.toml)
    #[arg(long)]
    pub courtesy_delay_ms: Option<u64>,

    /// Maximum attempts per request (overrides config.toml)
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Purchase event topic0 (overrides config.toml)
    #[arg(long)]
    pub event_signature: Option<String>,

    /// Purchase confirmation strategy (overrides config.toml)
    #[arg(long, value_enum)]
    pub classification: Option<ClassificationArg>,

    /// Blocks after the purchase searched for a payout (overrides config.toml)
    #[arg(long)]
    pub lookahead: Option<u64>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ClassificationArg {
    Signature,
    Marker,
    Either,
}

impl From<ClassificationArg> for ClassificationMode {
    fn from(arg: ClassificationArg) -> Self {
        match arg {
            ClassificationArg::Signature => ClassificationMode::Signature,
            ClassificationArg::Marker => ClassificationMode::Marker,
            ClassificationArg::Either => ClassificationMode::Either,
        }
    }
}

impl ConfigOverrides {
    /// Load configuration from file/environment, apply CLI overrides, validate
    pub fn resolve(&self) -> AppResult<AppConfig> {
        let mut app_config = match AppConfig::load() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                config
            }
            Err(e) => {
                warn!("Failed to load configuration: {}", e);
                info!("Using defaults and CLI arguments");
                AppConfig::get_defaults().map_err(|e| AppError::Config(e.to_string()))?
            }
        };

        if let Some(url) = &self.base_url {
            app_config.explorer.base_url = url.clone();
        }
        if let Some(delay) = self.courtesy_delay_ms {
            app_config.explorer.courtesy_delay_ms = delay;
        }
        if let Some(retries) = self.max_retries {
            app_config.explorer.max_retries = retries;
        }
        if let Some(signature) = &self.event_signature {
            app_config.tracker.event_signature = signature.clone();
        }
        if let Some(mode) = self.classification {
            app_config.tracker.classification = mode.into();
        }
        if let Some(lookahead) = self.lookahead {
            app_config.tracker.lookahead_blocks = lookahead;
        }

        app_config.tracker.normalise();
        app_config
            .tracker
            .validate()
            .map_err(AppError::Config)?;

        info!("Configuration:");
        info!("  Explorer: {}", app_config.explorer.base_url);
        info!("  Purchase asset: {}", app_config.tracker.purchase_asset);
        info!("  Target contract: {}", app_config.tracker.target_contract);
        info!("  Classification: {:?}", app_config.tracker.classification);
        info!("  Lookahead: {} blocks", app_config.tracker.lookahead_blocks);

        Ok(app_config)
    }
}
