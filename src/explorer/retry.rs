//! Retry logic utilities for explorer requests
//!
//! Helpers for the bounded retry loop in [`super::ExplorerClient`].

use std::time::Duration;

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`. A multiplier
/// of `1.0` yields a fixed delay between attempts.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use reward_correlator::explorer::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(100);
/// let next = calculate_next_backoff(backoff, 2.0, 30);
/// assert_eq!(next, Duration::from_millis(200));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Whether a request error is worth retrying (timeouts and connection failures)
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
