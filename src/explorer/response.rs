//! Normalisation of explorer response bodies
//!
//! The explorer wraps every answer as `{ "result": <value> }`, where `result`
//! may be absent, a list, an object, or an error string such as
//! `"Max rate limit reached"`. Nothing here fails: unexpected shapes degrade
//! to empty results and missing fields to defaults.

use serde_json::Value;
use tracing::debug;

use crate::types::{normalise_address, EventLog, TransferRecord};
use crate::utils::units::parse_decimals;

/// Extract `result` as a list; anything else is treated as empty
pub fn result_items(body: &Value) -> Vec<Value> {
    match body.get("result") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            let message = body.get("message").and_then(Value::as_str).unwrap_or("");
            debug!(
                "Non-list explorer result treated as empty: {} ({})",
                truncate(&other.to_string(), 120),
                message
            );
            Vec::new()
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn str_field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Parse a height/quantity given as a JSON number, decimal string or `0x` hex string
pub fn parse_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse::<u64>().ok(),
            }
        }
        _ => None,
    }
}

/// Map one token-transfer row; rows without a transaction hash are dropped
pub fn parse_transfer(row: &Value) -> Option<TransferRecord> {
    let tx_hash = str_field(row, "hash").or_else(|| str_field(row, "transactionHash"))?;

    let token_address = str_field(row, "tokenAddress")
        .or_else(|| str_field(row, "contractAddress"))
        .map(normalise_address)
        .unwrap_or_default();

    Some(TransferRecord {
        tx_hash: normalise_address(tx_hash),
        block_number: row.get("blockNumber").and_then(parse_quantity).unwrap_or(0),
        from: str_field(row, "from").map(normalise_address).unwrap_or_default(),
        to: str_field(row, "to").map(normalise_address).unwrap_or_default(),
        token_address,
        token_symbol: str_field(row, "tokenSymbol").map(str::to_string),
        raw_amount: match row.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "0".to_string(),
        },
        decimals: parse_decimals(str_field(row, "tokenDecimal")).or_else(|| {
            row.get("tokenDecimal")
                .and_then(Value::as_u64)
                .and_then(|d| u32::try_from(d).ok())
        }),
    })
}

/// Map one event-log row; rows that are not objects are dropped
pub fn parse_log(row: &Value) -> Option<EventLog> {
    if !row.is_object() {
        return None;
    }

    let topics = row
        .get("topics")
        .and_then(Value::as_array)
        .map(|topics| {
            topics
                .iter()
                // Non-string topics keep their slot so positions stay stable
                .map(|topic| topic.as_str().map(normalise_address).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    Some(EventLog {
        address: str_field(row, "address").map(normalise_address).unwrap_or_default(),
        topics,
        data: str_field(row, "data").unwrap_or("0x").to_string(),
        payload: row.to_string().to_lowercase(),
    })
}

/// All parseable transfers in a response body
pub fn transfers_from_body(body: &Value) -> Vec<TransferRecord> {
    result_items(body).iter().filter_map(parse_transfer).collect()
}

/// All parseable logs in a response body
pub fn logs_from_body(body: &Value) -> Vec<EventLog> {
    result_items(body).iter().filter_map(parse_log).collect()
}

/// Head block from an `eth_block_number` style body
pub fn block_number_from_body(body: &Value) -> Option<u64> {
    body.get("result").and_then(parse_quantity)
}
