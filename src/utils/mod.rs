//! Small shared helpers: raw token amount scaling and hex input validation

pub mod hex_input;
pub mod units;
