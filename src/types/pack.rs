//! Purchase candidates, correlated output records and scan reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{RewardResult, TransferRecord};

/// A transfer of the purchase asset into the target contract, not yet classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCandidate {
    pub tx_hash: String,
    pub buyer: String,
    pub block_number: u64,
}

impl PurchaseCandidate {
    /// Extract a candidate when `transfer` moves `asset` into `contract`
    pub fn from_transfer(transfer: &TransferRecord, asset: &str, contract: &str) -> Option<Self> {
        if transfer.tx_hash.is_empty() || !transfer.is_asset_into(asset, contract) {
            return None;
        }
        Some(Self {
            tx_hash: transfer.tx_hash.clone(),
            buyer: transfer.from.clone(),
            block_number: transfer.block_number,
        })
    }
}

/// The unit of output: a confirmed purchase and, if found, its payout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPack {
    pub buy_tx_hash: String,
    pub buyer: String,
    pub buy_block: u64,
    pub reward: Option<RewardResult>,
}

impl CorrelatedPack {
    pub fn new(candidate: PurchaseCandidate, reward: Option<RewardResult>) -> Self {
        Self {
            buy_tx_hash: candidate.tx_hash,
            buyer: candidate.buyer,
            buy_block: candidate.block_number,
            reward,
        }
    }
}

/// Why a backward scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanTermination {
    /// Collected the requested number of packs
    TargetReached,
    /// Hit the maximum number of pages/blocks; partial result
    SafetyBound,
    /// Upstream ran out of history
    Exhausted,
    /// Stop signal or deadline observed at a unit boundary
    Cancelled,
}

impl fmt::Display for ScanTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanTermination::TargetReached => "target reached",
            ScanTermination::SafetyBound => "safety bound reached",
            ScanTermination::Exhausted => "upstream history exhausted",
            ScanTermination::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Result of one backward scan, most recent purchase first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub packs: Vec<CorrelatedPack>,
    pub termination: ScanTermination,
    pub units_scanned: u64,
    pub candidates_checked: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn rewarded_count(&self) -> usize {
        self.packs.iter().filter(|p| p.reward.is_some()).count()
    }
}
