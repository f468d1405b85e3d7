//! Wire formatting of numbers and timestamps
//!
//! The hub expects a decimal point and a fixed number of fractional digits,
//! independent of any locale.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::support::errors::{CodecError, CodecResult};

/// Fractional digits of geo coordinates.
pub const COORDINATE_DECIMALS: usize = 6;

/// Fractional digits of meter values and consumed energy (kWh).
pub const ENERGY_DECIMALS: u32 = 3;

pub fn format_coordinate(element: &str, value: f64) -> CodecResult<String> {
    if !value.is_finite() {
        return Err(CodecError::invalid_value(element, value.to_string()));
    }
    let formatted = format!("{:.*}", COORDINATE_DECIMALS, value);
    // -0.000000 after rounding a tiny negative value
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        return Ok(formatted[1..].to_string());
    }
    Ok(formatted)
}

pub fn format_energy(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(ENERGY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", ENERGY_DECIMALS as usize, rounded)
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
