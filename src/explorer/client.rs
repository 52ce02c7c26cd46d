use crate::config::ExplorerConfig;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::explorer::response::{block_number_from_body, logs_from_body, transfers_from_body};
use crate::explorer::{calculate_next_backoff, is_transient, AddressTransferQuery, ExplorerApi};
use crate::types::{EventLog, TransferRecord};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Request counters for reporting upstream effort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub requests_sent: u64,
    pub retries: u64,
}

/// Explorer HTTP client with courtesy delay and bounded retry
///
/// Every request sleeps `courtesy_delay_ms` first. Timeouts and connection
/// failures are retried up to `max_retries` total attempts with backoff between
/// them; a body that is not valid JSON is treated as an empty object.
pub struct ExplorerClient {
    http: reqwest::Client,
    config: ExplorerConfig,
    requests_sent: Arc<AtomicU64>,
    retries: Arc<AtomicU64>,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> ExplorerResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ExplorerError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            config,
            requests_sent: Arc::new(AtomicU64::new(0)),
            retries: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }

    /// GET the explorer endpoint with `params`, retrying transient failures
    pub async fn fetch(&self, params: &[(&str, String)]) -> ExplorerResult<Value> {
        let operation = describe(params);
        let max_attempts = self.config.max_retries.max(1);
        let courtesy = Duration::from_millis(self.config.courtesy_delay_ms);
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);
        let mut attempts = 0usize;

        loop {
            sleep(courtesy).await;
            self.requests_sent.fetch_add(1, Ordering::Relaxed);

            let failure = match self.try_fetch(&operation, params).await {
                Ok(body) => {
                    if attempts > 0 {
                        debug!("{} succeeded after {} attempts", operation, attempts + 1);
                    }
                    return Ok(body);
                }
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Transient(e)) => e,
            };

            attempts += 1;
            if attempts >= max_attempts {
                error!(
                    "Explorer request {} failed after {} attempts: {}",
                    operation, attempts, failure
                );
                return Err(ExplorerError::TransientFetch {
                    operation,
                    attempts,
                    message: failure.to_string(),
                });
            }

            warn!(
                "Explorer attempt {} failed for {}, retrying in {:?}: {}",
                attempts, operation, backoff, failure
            );
            self.retries.fetch_add(1, Ordering::Relaxed);
            sleep(backoff).await;

            backoff = calculate_next_backoff(
                backoff,
                self.config.backoff_multiplier,
                self.config.max_backoff_seconds,
            );
        }
    }

    async fn try_fetch(&self, operation: &str, params: &[(&str, String)]) -> Result<Value, Attempt> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| classify(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Attempt::Fatal(ExplorerError::HttpStatus {
                status: status.as_u16(),
                operation: operation.to_string(),
            }));
        }

        let bytes = response.bytes().await.map_err(|e| classify(operation, e))?;

        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            debug!("Malformed explorer body for {} treated as empty: {}", operation, e);
            Value::Object(Default::default())
        }))
    }
}

/// Outcome of a single failed attempt
enum Attempt {
    Transient(reqwest::Error),
    Fatal(ExplorerError),
}

fn classify(operation: &str, err: reqwest::Error) -> Attempt {
    if is_transient(&err) {
        Attempt::Transient(err)
    } else {
        Attempt::Fatal(ExplorerError::Request {
            operation: operation.to_string(),
            message: err.to_string(),
        })
    }
}

/// Short `module.action(key=value, ...)` label for logs and errors
fn describe(params: &[(&str, String)]) -> String {
    let lookup = |key: &str| {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("?")
    };
    let rest: Vec<String> = params
        .iter()
        .filter(|(k, _)| *k != "module" && *k != "action")
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("{}.{}({})", lookup("module"), lookup("action"), rest.join(", "))
}

fn address_query_params(query: &AddressTransferQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("module", "account".to_string()),
        ("action", "tokentx".to_string()),
        ("address", query.address.clone()),
    ];
    if let Some(start) = query.start_block {
        params.push(("startblock", start.to_string()));
    }
    if let Some(end) = query.end_block {
        params.push(("endblock", end.to_string()));
    }
    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset", offset.to_string()));
    }
    params.push(("sort", query.sort.as_param().to_string()));
    params
}

impl ExplorerApi for ExplorerClient {
    async fn token_transfers_for_tx(&self, tx_hash: &str) -> ExplorerResult<Vec<TransferRecord>> {
        let body = self
            .fetch(&[
                ("module", "account".to_string()),
                ("action", "tokentx".to_string()),
                ("txhash", tx_hash.to_string()),
            ])
            .await?;
        Ok(transfers_from_body(&body))
    }

    async fn logs_for_tx(&self, tx_hash: &str) -> ExplorerResult<Vec<EventLog>> {
        let body = self
            .fetch(&[
                ("module", "logs".to_string()),
                ("action", "getLogs".to_string()),
                ("txhash", tx_hash.to_string()),
            ])
            .await?;
        Ok(logs_from_body(&body))
    }

    async fn address_transfers(
        &self,
        query: &AddressTransferQuery,
    ) -> ExplorerResult<Vec<TransferRecord>> {
        let body = self.fetch(&address_query_params(query)).await?;
        Ok(transfers_from_body(&body))
    }

    async fn latest_block(&self) -> ExplorerResult<Option<u64>> {
        let body = self
            .fetch(&[
                ("module", "block".to_string()),
                ("action", "eth_block_number".to_string()),
            ])
            .await?;
        Ok(block_number_from_body(&body))
    }
}
