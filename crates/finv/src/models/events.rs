use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash dividend paid on an instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    /// Amount per share, in the instrument currency
    pub amount: Decimal,

    /// Ex-dividend date
    pub date: DateTime<Utc>,
}

/// Stock split event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Ratio as published by the provider (e.g. "4:1")
    pub ratio: String,

    pub date: DateTime<Utc>,
}
