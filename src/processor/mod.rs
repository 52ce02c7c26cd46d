//! Correlation pipeline: classify purchases, locate payouts, scan history

pub mod base;
pub mod classifier;
pub mod pipeline;
pub mod reward_locator;
pub mod scanner;

pub use base::{format_elapsed_time, ScanControl, StandardProgressTracker};
pub use classifier::{
    policy_from_config, AnyPolicy, EventSignaturePolicy, MarkerPolicy, PurchaseClassifier,
    PurchasePolicy,
};
pub use pipeline::Correlator;
pub use reward_locator::RewardLocator;
pub use scanner::{BackwardScanner, ScanCursor};
