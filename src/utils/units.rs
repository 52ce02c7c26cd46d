//! Token amount scaling
//!
//! Explorer APIs report token values as raw base-unit integers (decimal strings)
//! next to a separate decimal count. These helpers turn that pair into a
//! human-scale number.

/// Scale a raw base-unit amount by `10^decimals`
///
/// Absent or zero decimals, or a count too large for an exponent, leave the
/// raw value unscaled. Unparseable raw values scale to `0.0` rather than
/// erroring.
///
/// # Examples
/// ```
/// use reward_correlator::utils::units::scale_raw_amount;
///
/// assert_eq!(scale_raw_amount("2500000000000000000", Some(18)), 2.5);
/// assert_eq!(scale_raw_amount("1500000", Some(6)), 1.5);
/// assert_eq!(scale_raw_amount("42", None), 42.0);
/// assert_eq!(scale_raw_amount("42", Some(0)), 42.0);
/// ```
pub fn scale_raw_amount(raw: &str, decimals: Option<u32>) -> f64 {
    let value = parse_raw(raw);
    match decimals.and_then(|d| i32::try_from(d).ok()) {
        Some(d) if d > 0 => value / 10f64.powi(d),
        _ => value,
    }
}

/// Parse a raw decimal string, falling back to f64 for values wider than u128
fn parse_raw(raw: &str) -> f64 {
    let raw = raw.trim();
    raw.parse::<u128>()
        .map(|v| v as f64)
        .or_else(|_| raw.parse::<f64>())
        .unwrap_or(0.0)
}

/// Parse an optional decimal-count field; empty or non-numeric means absent
pub fn parse_decimals(field: Option<&str>) -> Option<u32> {
    field.and_then(|s| s.trim().parse::<u32>().ok())
}
