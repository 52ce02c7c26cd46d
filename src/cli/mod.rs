use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Purchase/payout correlation scanner
#[derive(Parser)]
#[command(name = "reward-correlator")]
#[command(about = "Correlate contract purchases with their reward payouts via a block-explorer API")]
#[command(version)]
pub struct Cli {
    /// Log at info level when RUST_LOG is unset
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify one known purchase transaction and attach its reward
    Track(commands::track::TrackCommand),
    /// Walk history backward collecting correlated purchases
    Scan(commands::scan::ScanCommand),
    /// Check that the explorer API is reachable
    TestExplorer(commands::test_explorer::TestExplorerCommand),
}

pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Uses RUST_LOG environment variable (defaults to "error", or "info" with --verbose)
    let default_filter = if cli.verbose { "info" } else { "error" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Track(command) => command.run().await,
        Commands::Scan(command) => command.run().await,
        Commands::TestExplorer(command) => command.run().await,
    }
}
