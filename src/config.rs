use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from config.toml or environment variables
///
/// Built once at startup and shared by reference with every component; nothing
/// below mutates it after `load()` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub explorer: ExplorerConfig,
    pub tracker: TrackerConfig,
}

/// Block-explorer HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Sleep before every request (rate-limit courtesy)
    pub courtesy_delay_ms: u64,
    /// Total attempts per request, including the first
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://base.blockscout.com/api".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            timeout_seconds: 30,
            courtesy_delay_ms: 500,
            max_retries: 3,
            initial_backoff_ms: 2000,
            backoff_multiplier: 1.0,
            max_backoff_seconds: 30,
        }
    }
}

/// Which event-log test confirms a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Exact topic0 match against `event_signature`
    Signature,
    /// Substring match of `marker` inside the serialised log payload
    Marker,
    /// Either of the above
    Either,
}

/// How the backward scanner walks history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Pages of most-recent-first transfer history
    Pages,
    /// One block at a time, counting down
    Blocks,
}

/// Correlation parameters shared by classifier, locator and scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub purchase_asset: String,
    pub target_contract: String,
    /// topic0 of the purchase event; verify against the deployed contract
    pub event_signature: String,
    pub marker: String,
    pub classification: ClassificationMode,
    pub lookahead_blocks: u64,
    /// Safety bound: maximum pages or blocks visited per scan
    pub max_scan_units: u64,
    pub page_size: u64,
    pub scan_mode: ScanMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            purchase_asset: "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913".to_string(),
            target_contract: "0x7f84b6cd975db619e3f872e3f8734960353c7a09".to_string(),
            event_signature: "0xb46ce08eb89d4239a12b7d0a46b94864a9d6875da7b8828f7e0d1e3b058d487c"
                .to_string(),
            marker: "jackpot".to_string(),
            classification: ClassificationMode::Signature,
            lookahead_blocks: 50,
            max_scan_units: 50,
            page_size: 50,
            scan_mode: ScanMode::Pages,
        }
    }
}

impl TrackerConfig {
    /// Lowercase every address/topic so later comparisons are plain equality
    pub fn normalise(&mut self) {
        self.purchase_asset = self.purchase_asset.trim().to_lowercase();
        self.target_contract = self.target_contract.trim().to_lowercase();
        self.event_signature = self.event_signature.trim().to_lowercase();
        self.marker = self.marker.to_lowercase();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.purchase_asset.is_empty() {
            return Err("tracker.purchase_asset must be set".to_string());
        }
        if self.target_contract.is_empty() {
            return Err("tracker.target_contract must be set".to_string());
        }
        if self.lookahead_blocks == 0 {
            return Err("tracker.lookahead_blocks must be greater than 0".to_string());
        }
        if self.max_scan_units == 0 {
            return Err("tracker.max_scan_units must be greater than 0".to_string());
        }
        if self.page_size == 0 {
            return Err("tracker.page_size must be greater than 0".to_string());
        }
        match self.classification {
            ClassificationMode::Signature if self.event_signature.is_empty() => {
                Err("tracker.event_signature is required for signature classification".to_string())
            }
            ClassificationMode::Marker if self.marker.is_empty() => {
                Err("tracker.marker is required for marker classification".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    ///
    /// Nested keys use a double underscore, e.g. `REWARD_TRACKER__LOOKAHEAD_BLOCKS=80`.
    pub fn load() -> Result<Self, ConfigError> {
        let explorer = ExplorerConfig::default();
        let tracker = TrackerConfig::default();
        let config = Config::builder()
            .set_default("explorer.base_url", explorer.base_url)?
            .set_default("explorer.user_agent", explorer.user_agent)?
            .set_default("explorer.timeout_seconds", explorer.timeout_seconds)?
            .set_default("explorer.courtesy_delay_ms", explorer.courtesy_delay_ms)?
            .set_default("explorer.max_retries", explorer.max_retries as i64)?
            .set_default("explorer.initial_backoff_ms", explorer.initial_backoff_ms)?
            .set_default("explorer.backoff_multiplier", explorer.backoff_multiplier)?
            .set_default("explorer.max_backoff_seconds", explorer.max_backoff_seconds)?
            .set_default("tracker.purchase_asset", tracker.purchase_asset)?
            .set_default("tracker.target_contract", tracker.target_contract)?
            .set_default("tracker.event_signature", tracker.event_signature)?
            .set_default("tracker.marker", tracker.marker)?
            .set_default("tracker.classification", "signature")?
            .set_default("tracker.lookahead_blocks", tracker.lookahead_blocks)?
            .set_default("tracker.max_scan_units", tracker.max_scan_units)?
            .set_default("tracker.page_size", tracker.page_size)?
            .set_default("tracker.scan_mode", "pages")?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("REWARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Short names for the two values most often pointed elsewhere
        if let Ok(url) = env::var("EXPLORER_BASE_URL") {
            app_config.explorer.base_url = url;
        }
        if let Ok(contract) = env::var("TARGET_CONTRACT") {
            app_config.tracker.target_contract = contract;
        }

        app_config.tracker.normalise();
        app_config.tracker.validate().map_err(ConfigError::Message)?;

        Ok(app_config)
    }

    /// Get default config values when no file or environment is usable
    pub fn get_defaults() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => {
                let mut tracker = TrackerConfig::default();
                tracker.normalise();
                Ok(Self {
                    explorer: ExplorerConfig::default(),
                    tracker,
                })
            }
        }
    }
}
