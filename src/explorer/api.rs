//! The upstream capability consumed by the correlation pipeline
//!
//! Classifier, locator and scanner are generic over [`ExplorerApi`] so tests
//! can substitute a call-counting stub for the HTTP client.

use std::future::Future;

use crate::errors::ExplorerResult;
use crate::types::{EventLog, TransferRecord};

/// Ordering of address transfer history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Token transfers touching `address`, optionally bounded by block range and paginated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTransferQuery {
    pub address: String,
    pub start_block: Option<u64>,
    pub end_block: Option<u64>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub offset: Option<u64>,
    pub sort: SortOrder,
}

impl AddressTransferQuery {
    /// All transfers in the inclusive block range, oldest first
    pub fn block_range(address: &str, start_block: u64, end_block: u64) -> Self {
        Self {
            address: address.to_string(),
            start_block: Some(start_block),
            end_block: Some(end_block),
            page: None,
            offset: None,
            sort: SortOrder::Ascending,
        }
    }

    /// Transfers within a single block, most recent first
    pub fn single_block(address: &str, block: u64) -> Self {
        Self {
            sort: SortOrder::Descending,
            ..Self::block_range(address, block, block)
        }
    }

    /// One page of the full history, most recent first
    pub fn recent_page(address: &str, page: u64, page_size: u64) -> Self {
        Self {
            address: address.to_string(),
            start_block: None,
            end_block: None,
            page: Some(page),
            offset: Some(page_size),
            sort: SortOrder::Descending,
        }
    }
}

/// Explorer query shapes used by the pipeline
///
/// Implementations must normalise malformed or non-list `result` fields to an
/// empty vector and only return `Err` when the upstream could not be reached.
pub trait ExplorerApi {
    /// Token transfers emitted by one transaction
    fn token_transfers_for_tx(
        &self,
        tx_hash: &str,
    ) -> impl Future<Output = ExplorerResult<Vec<TransferRecord>>> + Send;

    /// Event logs emitted by one transaction
    fn logs_for_tx(&self, tx_hash: &str)
        -> impl Future<Output = ExplorerResult<Vec<EventLog>>> + Send;

    /// Token transfers for an address, shaped by `query`
    fn address_transfers(
        &self,
        query: &AddressTransferQuery,
    ) -> impl Future<Output = ExplorerResult<Vec<TransferRecord>>> + Send;

    /// Current head block height, if the upstream reports one
    fn latest_block(&self) -> impl Future<Output = ExplorerResult<Option<u64>>> + Send;
}
