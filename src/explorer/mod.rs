//! Block-explorer API integration module
//!
//! This module isolates every call to the upstream explorer:
//! - **Client** - HTTP client with courtesy delay and bounded retry
//! - **Api** - The `ExplorerApi` capability trait (the three query shapes plus head block)
//! - **Response** - Normalisation of `{ "result": ... }` bodies into typed records
//! - **Retry** - Backoff and transient-error helpers

pub mod api;
pub mod client;
pub mod response;
pub mod retry;

// Re-export main types
pub use api::{AddressTransferQuery, ExplorerApi, SortOrder};
pub use client::{ClientStats, ExplorerClient};
pub use retry::{calculate_next_backoff, is_transient};
