use super::ConfigOverrides;
use crate::cli::output::{write_report, OutputFormat};
use crate::config::ScanMode;
use crate::errors::{AppError, AppResult};
use crate::explorer::ExplorerClient;
use crate::processor::{format_elapsed_time, Correlator, ScanControl};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScanModeArg {
    Pages,
    Blocks,
}

impl From<ScanModeArg> for ScanMode {
    fn from(arg: ScanModeArg) -> Self {
        match arg {
            ScanModeArg::Pages => ScanMode::Pages,
            ScanModeArg::Blocks => ScanMode::Blocks,
        }
    }
}

/// Walk history backward collecting correlated purchases
#[derive(Args)]
pub struct ScanCommand {
    /// Number of correlated purchases to collect
    #[arg(long, default_value = "10")]
    pub count: usize,

    /// Walk pages of transfer history or individual blocks (overrides config.toml)
    #[arg(long, value_enum)]
    pub mode: Option<ScanModeArg>,

    /// First block to scan in block mode (default: explorer head block)
    #[arg(long)]
    pub from_block: Option<u64>,

    /// Maximum pages/blocks visited before giving up (overrides config.toml)
    #[arg(long)]
    pub max_units: Option<u64>,

    /// Transfers per page in page mode (overrides config.toml)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Stop after this many seconds, returning what was collected
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl ScanCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Backward Purchase Scan ===");

        let mut app_config = self.overrides.resolve()?;
        if let Some(mode) = self.mode {
            app_config.tracker.scan_mode = mode.into();
        }
        if let Some(max_units) = self.max_units {
            app_config.tracker.max_scan_units = max_units;
        }
        if let Some(page_size) = self.page_size {
            app_config.tracker.page_size = page_size;
        }
        app_config.tracker.validate().map_err(AppError::Config)?;

        info!("  Scan mode: {:?}", app_config.tracker.scan_mode);
        info!("  Max units: {}", app_config.tracker.max_scan_units);
        info!("  Target count: {}", self.count);

        let mut control = ScanControl::new();
        if let Some(secs) = self.timeout_secs {
            control = control.with_timeout(Duration::from_secs(secs));
        }
        let signal_control = control.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping at next block/page boundary");
                signal_control.request_stop();
            }
        });

        let client = ExplorerClient::new(app_config.explorer)?;
        let correlator = Correlator::new(client, app_config.tracker);

        let report = correlator
            .scan_backward_from(self.count, self.from_block, control)
            .await?;

        write_report(&report, self.format, self.output.as_deref())?;

        let elapsed = (report.finished_at - report.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let stats = correlator.api().stats();
        eprintln!(
            "Collected {} of {} purchases ({} with reward) - {} after {} units, {} candidates, {} requests, {}",
            report.packs.len(),
            self.count,
            report.rewarded_count(),
            report.termination,
            report.units_scanned,
            report.candidates_checked,
            stats.requests_sent,
            format_elapsed_time(elapsed)
        );

        Ok(())
    }
}
