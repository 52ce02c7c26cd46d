//! Common on-chain record types
//!
//! These are the typed views of explorer rows used throughout the correlation
//! pipeline. All address-like fields are stored lowercase so comparisons are
//! plain string equality.

use serde::{Deserialize, Serialize};

use crate::utils::units::scale_raw_amount;

/// Lowercase and trim an address, hash or topic for comparison
pub fn normalise_address(value: &str) -> String {
    value.trim().to_lowercase()
}

/// One token movement as reported by the explorer's token-transfer queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub tx_hash: String,
    pub block_number: u64,
    pub from: String,
    pub to: String,
    /// Token contract address; empty when the explorer omitted it
    pub token_address: String,
    pub token_symbol: Option<String>,
    /// Base-unit integer amount as a decimal string (may exceed u128)
    pub raw_amount: String,
    pub decimals: Option<u32>,
}

impl TransferRecord {
    /// Decimal-adjusted amount (`raw / 10^decimals`, or raw when decimals are absent/zero)
    pub fn amount(&self) -> f64 {
        scale_raw_amount(&self.raw_amount, self.decimals)
    }

    /// Transfer of `asset` into `contract`, regardless of sender
    pub fn is_asset_into(&self, asset: &str, contract: &str) -> bool {
        self.token_address == asset && self.to == contract
    }

    /// Transfer of `asset` from `sender` into `contract`
    pub fn is_asset_payment(&self, asset: &str, sender: &str, contract: &str) -> bool {
        self.is_asset_into(asset, contract) && self.from == sender
    }
}

/// One event log emitted by a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub address: String,
    /// Lowercased topics; `topics[0]` is the event signature hash
    pub topics: Vec<String>,
    pub data: String,
    /// Lowercased serialised form of the whole upstream log object
    pub payload: String,
}

impl EventLog {
    pub fn topic0(&self) -> Option<&str> {
        self.topics.first().map(String::as_str)
    }
}
