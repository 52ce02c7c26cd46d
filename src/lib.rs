//! Purchase/payout correlation scanner
//!
//! Finds purchases sent to a target contract through a block-explorer API,
//! confirms them by event log, and pairs each with the reward payout the
//! contract sent back to the buyer within a bounded block window.

pub mod cli;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod processor;
pub mod types;
pub mod utils;
