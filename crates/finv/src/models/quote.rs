use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time quote for an instrument.
///
/// Numeric fields the provider leaves out are stored as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Time of the last regular market trade, when the provider sends one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_time: Option<DateTime<Utc>>,

    /// Last regular market price
    pub price: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    pub open: Decimal,

    pub previous_close: Decimal,

    pub day_low: Decimal,

    pub day_high: Decimal,

    /// Traded volume for the session
    pub volume: i64,

    pub bid: Decimal,

    pub ask: Decimal,
}

/// One trading period from the chart endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalQuote {
    /// Start of the trading period
    pub date: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
    /// Close adjusted for splits and dividends, zero when not provided
    pub adj_close: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub volume: i64,
}
