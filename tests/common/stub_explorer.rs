//! In-memory explorer stub
//!
//! Emulates the explorer's address-transfer filtering (block range, sort,
//! pagination) over a fixed history and counts every call so tests can assert
//! which queries the pipeline issued.

use reward_correlator::errors::{ExplorerError, ExplorerResult};
use reward_correlator::explorer::{AddressTransferQuery, ExplorerApi, SortOrder};
use reward_correlator::types::{EventLog, TransferRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::fixtures::purchase_transfer;

#[derive(Default)]
pub struct StubExplorer {
    tx_transfers: HashMap<String, Vec<TransferRecord>>,
    tx_logs: HashMap<String, Vec<EventLog>>,
    history: Vec<TransferRecord>,
    head: Option<u64>,
    fail_logs: bool,

    pub tx_transfer_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
    pub address_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
    queries: Mutex<Vec<AddressTransferQuery>>,
}

impl StubExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transfer to the contract's history and to its transaction's transfers
    pub fn with_transfer(mut self, transfer: TransferRecord) -> Self {
        self.tx_transfers
            .entry(transfer.tx_hash.clone())
            .or_default()
            .push(transfer.clone());
        self.history.push(transfer);
        self
    }

    pub fn with_logs(mut self, tx_hash: &str, logs: Vec<EventLog>) -> Self {
        self.tx_logs.entry(tx_hash.to_string()).or_default().extend(logs);
        self
    }

    /// Asset payment into the contract plus the logs its transaction emitted
    pub fn with_purchase(self, hash: &str, buyer: &str, block: u64, logs: Vec<EventLog>) -> Self {
        self.with_transfer(purchase_transfer(hash, buyer, block))
            .with_logs(hash, logs)
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = Some(head);
        self
    }

    /// Make every log query fail as if the upstream were unreachable
    pub fn failing_logs(mut self) -> Self {
        self.fail_logs = true;
        self
    }

    pub fn address_queries(&self) -> Vec<AddressTransferQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Address queries that carried an explicit block range wider than one block
    pub fn range_queries(&self) -> Vec<AddressTransferQuery> {
        self.address_queries()
            .into_iter()
            .filter(|q| q.page.is_none() && q.start_block != q.end_block)
            .collect()
    }

    fn filter_history(&self, query: &AddressTransferQuery) -> Vec<TransferRecord> {
        let address = query.address.to_lowercase();
        let mut rows: Vec<TransferRecord> = self
            .history
            .iter()
            .filter(|t| t.from == address || t.to == address)
            .filter(|t| query.start_block.map_or(true, |start| t.block_number >= start))
            .filter(|t| query.end_block.map_or(true, |end| t.block_number <= end))
            .cloned()
            .collect();

        match query.sort {
            SortOrder::Ascending => rows.sort_by_key(|t| t.block_number),
            SortOrder::Descending => rows.sort_by(|a, b| b.block_number.cmp(&a.block_number)),
        }

        match (query.page, query.offset) {
            (Some(page), Some(offset)) => {
                let skip = (page.saturating_sub(1) * offset) as usize;
                rows.into_iter().skip(skip).take(offset as usize).collect()
            }
            _ => rows,
        }
    }
}

impl ExplorerApi for StubExplorer {
    async fn token_transfers_for_tx(&self, tx_hash: &str) -> ExplorerResult<Vec<TransferRecord>> {
        self.tx_transfer_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tx_transfers.get(tx_hash).cloned().unwrap_or_default())
    }

    async fn logs_for_tx(&self, tx_hash: &str) -> ExplorerResult<Vec<EventLog>> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logs {
            return Err(ExplorerError::TransientFetch {
                operation: format!("logs for {}", tx_hash),
                attempts: 3,
                message: "connection refused".to_string(),
            });
        }
        Ok(self.tx_logs.get(tx_hash).cloned().unwrap_or_default())
    }

    async fn address_transfers(
        &self,
        query: &AddressTransferQuery,
    ) -> ExplorerResult<Vec<TransferRecord>> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.filter_history(query))
    }

    async fn latest_block(&self) -> ExplorerResult<Option<u64>> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head)
    }
}

/// Shorthand for reading a call counter
pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

