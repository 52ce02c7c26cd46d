use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Block-explorer API operations
    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    /// Classifier rejected the transaction (single-transaction pipeline only)
    #[error("Transaction {tx_hash} is not a qualifying purchase")]
    NotQualifyingPurchase { tx_hash: String },

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing of user-supplied input
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Block-explorer API error types
///
/// Malformed or unexpected response bodies have no variant; the client
/// normalises them to empty results.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Timeout or connection failure that persisted through every retry
    #[error("Transient fetch failure after {attempts} attempts: {operation} - {message}")]
    TransientFetch {
        operation: String,
        attempts: usize,
        message: String,
    },

    /// Upstream answered with a non-success HTTP status
    #[error("HTTP {status} for {operation}")]
    HttpStatus { status: u16, operation: String },

    /// Request could not be issued for a non-transient reason (bad URL, redirect loop)
    #[error("Request failed: {operation} - {message}")]
    Request { operation: String, message: String },

    /// The HTTP client itself could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for explorer operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
