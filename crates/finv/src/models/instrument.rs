use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::events::{Dividend, Split};
use super::quote::{HistoricalQuote, Quote};
use crate::errors::FinvError;

/// A tradable security and everything fetched about it.
///
/// Only the symbol is known up front. Every other field starts as `None` and is
/// filled by the provider responsible for it, either completely from a single
/// parse or not at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    #[serde(deserialize_with = "deserialize_symbol")]
    symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// ISO 4217 currency code (e.g. "USD")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Full exchange name (e.g. "NasdaqGS")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    /// Market session state (e.g. "REGULAR", "CLOSED")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_state: Option<String>,

    /// Provider asset class (e.g. "EQUITY", "ETF")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Exchange timezone name (e.g. "America/New_York")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,

    /// Chronological trading history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoricalQuote>>,

    /// Dividends in ascending date order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividends: Option<Vec<Dividend>>,

    /// Splits in ascending date order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<Split>>,
}

impl Instrument {
    /// Create an empty instrument for `symbol`.
    ///
    /// Surrounding whitespace is trimmed; a blank symbol is rejected.
    pub fn new(symbol: impl Into<String>) -> Result<Self, FinvError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(FinvError::InvalidInput("symbol must not be empty".to_string()));
        }

        Ok(Self {
            symbol,
            name: None,
            currency: None,
            exchange: None,
            market_state: None,
            quote_type: None,
            region: None,
            timezone: None,
            quote_source: None,
            quote: None,
            history: None,
            dividends: None,
            splits: None,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Historical records, empty when none were fetched.
    pub fn history(&self) -> &[HistoricalQuote] {
        self.history.as_deref().unwrap_or_default()
    }

    /// Dividend records, empty when none were fetched.
    pub fn dividends(&self) -> &[Dividend] {
        self.dividends.as_deref().unwrap_or_default()
    }

    /// Split records, empty when none were fetched.
    pub fn splits(&self) -> &[Split] {
        self.splits.as_deref().unwrap_or_default()
    }
}

/// Applies the same trimming and non-blank check as [`Instrument::new`].
fn deserialize_symbol<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let symbol = String::deserialize(deserializer)?;
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("symbol must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "** {} **", self.symbol)?;
        writeln!(f, "symbol: {}", self.symbol)?;
        writeln!(f, "name: {}", opt(&self.name))?;
        writeln!(f, "currency: {}", opt(&self.currency))?;
        writeln!(f, "exchange: {}", opt(&self.exchange))?;
        writeln!(f, "marketState: {}", opt(&self.market_state))?;
        writeln!(f, "quoteType: {}", opt(&self.quote_type))?;
        writeln!(f, "region: {}", opt(&self.region))?;
        writeln!(f, "timezone: {}", opt(&self.timezone))?;
        writeln!(f, "quoteSource: {}", opt(&self.quote_source))?;

        match &self.quote {
            Some(q) => writeln!(
                f,
                "quote: marketTime={} price={} change={} open={} previousClose={} low={} high={} volume={} bid={} ask={}",
                opt(&q.market_time),
                q.price,
                q.change,
                q.open,
                q.previous_close,
                q.day_low,
                q.day_high,
                q.volume,
                q.bid,
                q.ask
            )?,
            None => writeln!(f, "quote: None")?,
        }

        match &self.history {
            Some(history) => {
                writeln!(f, "history: {} records", history.len())?;
                for h in history {
                    writeln!(
                        f,
                        "  {} open={} close={} adjClose={} low={} high={} volume={}",
                        h.date.format("%Y-%m-%d"),
                        h.open,
                        h.close,
                        h.adj_close,
                        h.low,
                        h.high,
                        h.volume
                    )?;
                }
            }
            None => writeln!(f, "history: None")?,
        }

        match &self.dividends {
            Some(dividends) => {
                writeln!(f, "dividends: {} records", dividends.len())?;
                for d in dividends {
                    writeln!(f, "  {} amount={}", d.date.format("%Y-%m-%d"), d.amount)?;
                }
            }
            None => writeln!(f, "dividends: None")?,
        }

        match &self.splits {
            Some(splits) => {
                writeln!(f, "splits: {} records", splits.len())?;
                for s in splits {
                    writeln!(f, "  {} ratio={}", s.date.format("%Y-%m-%d"), s.ratio)?;
                }
            }
            None => writeln!(f, "splits: None")?,
        }

        Ok(())
    }
}
