//! Front door for the presentation layer
//!
//! [`Correlator`] owns the explorer handle and the frozen tracker configuration
//! and exposes the two produced operations: single-transaction processing and
//! the backward scan.

use tracing::{info, warn};

use super::base::ScanControl;
use super::{BackwardScanner, PurchaseClassifier, PurchasePolicy, RewardLocator};
use crate::config::TrackerConfig;
use crate::errors::{AppError, AppResult, ExplorerResult};
use crate::explorer::ExplorerApi;
use crate::types::{normalise_address, CorrelatedPack, PurchaseCandidate, ScanReport};

pub struct Correlator<A: ExplorerApi> {
    api: A,
    config: TrackerConfig,
    classifier: PurchaseClassifier,
    locator: RewardLocator,
}

impl<A: ExplorerApi> Correlator<A> {
    pub fn new(api: A, config: TrackerConfig) -> Self {
        let classifier = PurchaseClassifier::from_config(&config);
        let locator = RewardLocator::from_config(&config);
        Self {
            api,
            config,
            classifier,
            locator,
        }
    }

    /// Replace the configured classification policy
    pub fn with_policy(mut self, policy: Box<dyn PurchasePolicy + Send + Sync>) -> Self {
        self.classifier = PurchaseClassifier::with_policy(&self.config, policy);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Classify a known purchase and attach its reward
    ///
    /// Fails with [`AppError::NotQualifyingPurchase`] before any reward lookup
    /// when the classifier rejects the transaction.
    pub async fn process_purchase(
        &self,
        tx_hash: &str,
        buyer: &str,
        buy_block: u64,
    ) -> AppResult<CorrelatedPack> {
        let candidate = PurchaseCandidate {
            tx_hash: normalise_address(tx_hash),
            buyer: normalise_address(buyer),
            block_number: buy_block,
        };

        let qualifies = self
            .classifier
            .is_qualifying_purchase(&self.api, &candidate.tx_hash, &candidate.buyer)
            .await?;
        if !qualifies {
            warn!("{} rejected by {} classifier", candidate.tx_hash, self.classifier.policy_name());
            return Err(AppError::NotQualifyingPurchase {
                tx_hash: candidate.tx_hash,
            });
        }

        let reward = self
            .locator
            .locate_reward(&self.api, &candidate.buyer, candidate.block_number)
            .await?;
        info!(
            "Processed purchase {}: reward {}",
            candidate.tx_hash,
            if reward.is_some() { "found" } else { "not found" }
        );

        Ok(CorrelatedPack::new(candidate, reward))
    }

    /// Backward scan with the configured mode, starting at the newest history
    pub async fn scan_backward(
        &self,
        target_count: usize,
        control: ScanControl,
    ) -> ExplorerResult<ScanReport> {
        self.scan_backward_from(target_count, None, control).await
    }

    /// Backward scan; `start_block` pins the first height in block-indexed mode
    pub async fn scan_backward_from(
        &self,
        target_count: usize,
        start_block: Option<u64>,
        control: ScanControl,
    ) -> ExplorerResult<ScanReport> {
        BackwardScanner::new(&self.api, &self.config, &self.classifier, &self.locator)
            .with_control(control)
            .with_start_block(start_block)
            .scan(target_count)
            .await
    }
}
