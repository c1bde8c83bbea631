//! Response parsers.
//!
//! Pure functions from response bodies to domain records. Each extraction
//! comes in two flavours:
//! - `try_parse_*` returns a [`FinvError`] describing what was wrong
//! - `parse_*` logs that error and degrades to an empty or absent result
//!
//! Numeric fields the provider leaves out (or sends as `null`) become zero.

pub mod chart;
pub mod options;

use chrono::{DateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;

use crate::errors::FinvError;

pub use chart::{
    parse_dividends, parse_history, parse_splits, try_parse_dividends, try_parse_history,
    try_parse_splits, ChartDocument,
};
pub use options::{
    parse_profile, parse_quote, try_parse_profile, try_parse_quote, Profile,
};

/// Decimal value of an optional provider number, zero when absent or not finite.
pub(crate) fn decimal_or_zero(value: Option<f64>) -> Decimal {
    value.and_then(Decimal::from_f64).unwrap_or_default()
}

/// Integer value of an optional provider number, zero when absent or not finite.
pub(crate) fn integer_or_zero(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() => v.round() as i64,
        _ => 0,
    }
}

/// UTC instant for a Unix timestamp in seconds.
pub(crate) fn from_unix_seconds(
    context: &'static str,
    seconds: i64,
) -> Result<DateTime<Utc>, FinvError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| FinvError::parse(context, format!("invalid timestamp: {}", seconds)))
}
