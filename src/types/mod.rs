//! Data model shared by the explorer client, classifier, locator and scanner

pub mod common;
pub mod pack;
pub mod reward;

pub use common::{normalise_address, EventLog, TransferRecord};
pub use pack::{CorrelatedPack, PurchaseCandidate, ScanReport, ScanTermination};
pub use reward::{ConfidenceTier, RewardResult, TokenPayout};
