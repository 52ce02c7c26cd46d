//! Purchase classification
//!
//! A transaction qualifies as a purchase when it (1) moves the purchase asset
//! from the buyer into the target contract and (2) emits a log accepted by the
//! configured [`PurchasePolicy`]. The transfer check runs first; logs are only
//! fetched once it passes.

use tracing::debug;

use crate::config::{ClassificationMode, TrackerConfig};
use crate::errors::ExplorerResult;
use crate::explorer::ExplorerApi;
use crate::types::{normalise_address, EventLog};

/// Decides whether an event log marks the purchase of the target product
pub trait PurchasePolicy {
    /// Short name for logging
    fn name(&self) -> &'static str;

    fn matches(&self, log: &EventLog) -> bool;
}

/// Exact match of `topics[0]` against a known event signature hash
pub struct EventSignaturePolicy {
    signature: String,
}

impl EventSignaturePolicy {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: normalise_address(signature),
        }
    }
}

impl PurchasePolicy for EventSignaturePolicy {
    fn name(&self) -> &'static str {
        "event-signature"
    }

    fn matches(&self, log: &EventLog) -> bool {
        log.topic0() == Some(self.signature.as_str())
    }
}

/// Case-insensitive substring match over the serialised log payload
pub struct MarkerPolicy {
    marker: String,
}

impl MarkerPolicy {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_lowercase(),
        }
    }
}

impl PurchasePolicy for MarkerPolicy {
    fn name(&self) -> &'static str {
        "payload-marker"
    }

    fn matches(&self, log: &EventLog) -> bool {
        !self.marker.is_empty() && log.payload.contains(&self.marker)
    }
}

/// Accepts a log when any inner policy does
pub struct AnyPolicy {
    policies: Vec<Box<dyn PurchasePolicy + Send + Sync>>,
}

impl AnyPolicy {
    pub fn new(policies: Vec<Box<dyn PurchasePolicy + Send + Sync>>) -> Self {
        Self { policies }
    }
}

impl PurchasePolicy for AnyPolicy {
    fn name(&self) -> &'static str {
        "any-of"
    }

    fn matches(&self, log: &EventLog) -> bool {
        self.policies.iter().any(|p| p.matches(log))
    }
}

/// Build the policy selected by `tracker.classification`
pub fn policy_from_config(config: &TrackerConfig) -> Box<dyn PurchasePolicy + Send + Sync> {
    match config.classification {
        ClassificationMode::Signature => Box::new(EventSignaturePolicy::new(&config.event_signature)),
        ClassificationMode::Marker => Box::new(MarkerPolicy::new(&config.marker)),
        ClassificationMode::Either => Box::new(AnyPolicy::new(vec![
            Box::new(EventSignaturePolicy::new(&config.event_signature)),
            Box::new(MarkerPolicy::new(&config.marker)),
        ])),
    }
}

/// Confirms purchase transactions against the explorer
pub struct PurchaseClassifier {
    purchase_asset: String,
    target_contract: String,
    policy: Box<dyn PurchasePolicy + Send + Sync>,
}

impl PurchaseClassifier {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::with_policy(config, policy_from_config(config))
    }

    pub fn with_policy(config: &TrackerConfig, policy: Box<dyn PurchasePolicy + Send + Sync>) -> Self {
        Self {
            purchase_asset: normalise_address(&config.purchase_asset),
            target_contract: normalise_address(&config.target_contract),
            policy,
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Whether `tx_hash` is a qualifying purchase made by `buyer`
    ///
    /// Returns `Ok(false)` without fetching logs when the transaction carries no
    /// matching asset payment.
    pub async fn is_qualifying_purchase<A: ExplorerApi>(
        &self,
        api: &A,
        tx_hash: &str,
        buyer: &str,
    ) -> ExplorerResult<bool> {
        let buyer = normalise_address(buyer);
        let transfers = api.token_transfers_for_tx(tx_hash).await?;

        let paid = transfers
            .iter()
            .any(|t| t.is_asset_payment(&self.purchase_asset, &buyer, &self.target_contract));
        if !paid {
            debug!("{}: no asset payment from {} to target contract", tx_hash, buyer);
            return Ok(false);
        }

        let logs = api.logs_for_tx(tx_hash).await?;
        let matched = logs.iter().any(|log| self.policy.matches(log));
        debug!(
            "{}: {} logs checked, {} policy matched: {}",
            tx_hash,
            logs.len(),
            self.policy.name(),
            matched
        );
        Ok(matched)
    }
}
