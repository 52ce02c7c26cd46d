//! Validation of user-supplied hashes and addresses before they reach the explorer

use crate::errors::{AppError, AppResult};

/// Byte length of an EVM account/contract address
pub const ADDRESS_BYTES: usize = 20;

/// Byte length of a transaction hash
pub const TX_HASH_BYTES: usize = 32;

fn decode_prefixed(value: &str, expected: usize, what: &str) -> AppResult<String> {
    let trimmed = value.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AppError::InvalidData(format!("{} must start with 0x: {}", what, value)))?;

    let bytes = hex::decode(body)
        .map_err(|e| AppError::InvalidData(format!("{} is not valid hex ({}): {}", what, e, value)))?;

    if bytes.len() != expected {
        return Err(AppError::InvalidData(format!(
            "{} must be {} bytes, got {}: {}",
            what,
            expected,
            bytes.len(),
            value
        )));
    }

    Ok(format!("0x{}", body.to_lowercase()))
}

/// Validate and lowercase an address
pub fn parse_address(value: &str) -> AppResult<String> {
    decode_prefixed(value, ADDRESS_BYTES, "Address")
}

/// Validate and lowercase a transaction hash
pub fn parse_tx_hash(value: &str) -> AppResult<String> {
    decode_prefixed(value, TX_HASH_BYTES, "Transaction hash")
}
