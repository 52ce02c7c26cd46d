//! Backward scanner
//!
//! Walks the target contract's transfer history from newest to oldest, one page
//! or one block per unit, and correlates every purchase it confirms. The walk
//! stops at the first of: target count reached, safety bound hit, upstream
//! exhausted, or cancellation observed at a unit boundary.

use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info};

use super::base::{format_elapsed_time, ScanControl, StandardProgressTracker};
use super::{PurchaseClassifier, RewardLocator};
use crate::config::{ScanMode, TrackerConfig};
use crate::errors::ExplorerResult;
use crate::explorer::{AddressTransferQuery, ExplorerApi};
use crate::types::{
    normalise_address, CorrelatedPack, PurchaseCandidate, ScanReport, ScanTermination,
    TransferRecord,
};

/// Position of the scan in upstream history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCursor {
    /// 1-based page of most-recent-first history
    Page(u64),
    /// Block height, counting down
    Block(u64),
}

impl ScanCursor {
    fn query(&self, contract: &str, page_size: u64) -> AddressTransferQuery {
        match *self {
            ScanCursor::Page(page) => AddressTransferQuery::recent_page(contract, page, page_size),
            ScanCursor::Block(height) => AddressTransferQuery::single_block(contract, height),
        }
    }

    /// Whether the unit just processed was the last one upstream can offer
    ///
    /// Page mode ends only on an empty page; parsed row counts can fall short
    /// of what upstream actually sent.
    fn is_last(&self) -> bool {
        match *self {
            ScanCursor::Page(_) => false,
            ScanCursor::Block(height) => height == 0,
        }
    }

    fn next(self) -> Self {
        match self {
            ScanCursor::Page(page) => ScanCursor::Page(page + 1),
            ScanCursor::Block(height) => ScanCursor::Block(height.saturating_sub(1)),
        }
    }
}

/// Mutable state of one scan invocation
struct ScanState {
    packs: Vec<CorrelatedPack>,
    processed: HashSet<String>,
    candidates_checked: u64,
}

pub struct BackwardScanner<'a, A: ExplorerApi> {
    api: &'a A,
    config: &'a TrackerConfig,
    classifier: &'a PurchaseClassifier,
    locator: &'a RewardLocator,
    control: ScanControl,
    start_block: Option<u64>,
}

impl<'a, A: ExplorerApi> BackwardScanner<'a, A> {
    pub fn new(
        api: &'a A,
        config: &'a TrackerConfig,
        classifier: &'a PurchaseClassifier,
        locator: &'a RewardLocator,
    ) -> Self {
        Self {
            api,
            config,
            classifier,
            locator,
            control: ScanControl::default(),
            start_block: None,
        }
    }

    pub fn with_control(mut self, control: ScanControl) -> Self {
        self.control = control;
        self
    }

    /// Block-indexed mode only: start here instead of at the upstream head
    pub fn with_start_block(mut self, start_block: Option<u64>) -> Self {
        self.start_block = start_block;
        self
    }

    /// Collect up to `target_count` correlated packs, most recent purchase first
    pub async fn scan(&self, target_count: usize) -> ExplorerResult<ScanReport> {
        let started_at = Utc::now();
        let mut state = ScanState {
            packs: Vec::new(),
            processed: HashSet::new(),
            candidates_checked: 0,
        };
        let mut units_scanned = 0u64;

        let finish = |state: ScanState, termination: ScanTermination, units_scanned: u64| {
            ScanReport {
                packs: state.packs,
                termination,
                units_scanned,
                candidates_checked: state.candidates_checked,
                started_at,
                finished_at: Utc::now(),
            }
        };

        if target_count == 0 {
            return Ok(finish(state, ScanTermination::TargetReached, 0));
        }

        let mut cursor = match self.initial_cursor().await? {
            Some(cursor) => cursor,
            None => {
                info!("Upstream reported no head block; nothing to scan");
                return Ok(finish(state, ScanTermination::Exhausted, 0));
            }
        };

        let contract = normalise_address(&self.config.target_contract);
        let mut progress = StandardProgressTracker::new();
        progress.start();

        info!(
            "Scanning backward from {:?} for {} purchases (max {} units, {} policy)",
            cursor,
            target_count,
            self.config.max_scan_units,
            self.classifier.policy_name()
        );

        let termination = loop {
            if self.control.is_cancelled() {
                break ScanTermination::Cancelled;
            }

            let transfers = self
                .api
                .address_transfers(&cursor.query(&contract, self.config.page_size))
                .await?;
            units_scanned += 1;

            if transfers.is_empty() && matches!(cursor, ScanCursor::Page(_)) {
                break ScanTermination::Exhausted;
            }

            self.correlate_unit(&transfers, target_count, &mut state)
                .await?;

            if state.packs.len() >= target_count {
                break ScanTermination::TargetReached;
            }
            if cursor.is_last() {
                break ScanTermination::Exhausted;
            }
            if units_scanned >= self.config.max_scan_units {
                break ScanTermination::SafetyBound;
            }

            if progress.should_report() {
                info!(
                    "Scan progress: {} units, {} candidates, {}/{} packs, {}",
                    units_scanned,
                    state.candidates_checked,
                    state.packs.len(),
                    target_count,
                    format_elapsed_time(progress.elapsed_seconds())
                );
            }

            cursor = cursor.next();
        };

        info!(
            "Scan finished ({}): {} packs from {} units in {}",
            termination,
            state.packs.len(),
            units_scanned,
            format_elapsed_time(progress.elapsed_seconds())
        );

        Ok(finish(state, termination, units_scanned))
    }

    async fn initial_cursor(&self) -> ExplorerResult<Option<ScanCursor>> {
        match self.config.scan_mode {
            ScanMode::Pages => Ok(Some(ScanCursor::Page(1))),
            ScanMode::Blocks => match self.start_block {
                Some(height) => Ok(Some(ScanCursor::Block(height))),
                None => Ok(self.api.latest_block().await?.map(ScanCursor::Block)),
            },
        }
    }

    /// Classify and correlate the purchase candidates in one unit of history
    async fn correlate_unit(
        &self,
        transfers: &[TransferRecord],
        target_count: usize,
        state: &mut ScanState,
    ) -> ExplorerResult<()> {
        let asset = normalise_address(&self.config.purchase_asset);
        let contract = normalise_address(&self.config.target_contract);

        for transfer in transfers {
            let Some(candidate) = PurchaseCandidate::from_transfer(transfer, &asset, &contract)
            else {
                continue;
            };
            // One transaction can emit several transfer records
            if !state.processed.insert(candidate.tx_hash.clone()) {
                continue;
            }
            state.candidates_checked += 1;

            let qualifies = self
                .classifier
                .is_qualifying_purchase(self.api, &candidate.tx_hash, &candidate.buyer)
                .await?;
            if !qualifies {
                debug!("Skipping non-qualifying candidate {}", candidate.tx_hash);
                continue;
            }

            let reward = self
                .locator
                .locate_reward(self.api, &candidate.buyer, candidate.block_number)
                .await?;
            info!(
                "Purchase {} by {} at block {}: reward {}",
                candidate.tx_hash,
                candidate.buyer,
                candidate.block_number,
                reward
                    .as_ref()
                    .map(|r| format!("+{} blocks ({})", r.delay_blocks, r.confidence))
                    .unwrap_or_else(|| "not found".to_string())
            );
            state.packs.push(CorrelatedPack::new(candidate, reward));

            if state.packs.len() >= target_count {
                break;
            }
        }

        Ok(())
    }
}
