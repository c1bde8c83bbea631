//! Parsing of the chart endpoint (`chart.result[0]`).
//!
//! History, dividends and splits are extracted independently from the same
//! document: a malformed `events.splits` block does not affect the history.
//! Each extraction is all-or-nothing.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{decimal_or_zero, from_unix_seconds, integer_or_zero};
use crate::errors::FinvError;
use crate::models::{Dividend, HistoricalQuote, Split};

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseSeries>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct QuoteSeries {
    open: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct DividendNode {
    #[serde(default)]
    amount: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitNode {
    split_ratio: String,
}

/// The first result of a chart response, parsed once and queried per extraction.
#[derive(Clone, Debug)]
pub struct ChartDocument {
    result: Value,
}

impl ChartDocument {
    pub fn parse(body: &str) -> Result<Self, FinvError> {
        let response: ChartResponse =
            serde_json::from_str(body).map_err(|e| FinvError::parse("chart", e.to_string()))?;

        let first = response
            .chart
            .result
            .and_then(|results| results.into_iter().next());

        match first {
            Some(result) if result.is_object() => Ok(Self { result }),
            _ => {
                let reason = match response.chart.error {
                    Some(ChartError {
                        code, description, ..
                    }) => format!(
                        "{}: {}",
                        code.unwrap_or_else(|| "error".to_string()),
                        description.unwrap_or_default()
                    ),
                    None => "chart.result is empty".to_string(),
                };
                Err(FinvError::parse("chart", reason))
            }
        }
    }

    fn field<T: DeserializeOwned>(
        &self,
        context: &'static str,
        pointer: &str,
    ) -> Result<Option<T>, FinvError> {
        match self.result.pointer(pointer) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| FinvError::parse(context, format!("{}: {}", pointer, e))),
        }
    }

    /// Trading periods in the order the provider sent them.
    ///
    /// A result without timestamps (no trading in the range) yields no records.
    /// When the series have different lengths only the common prefix is kept.
    pub fn history(&self) -> Result<Vec<HistoricalQuote>, FinvError> {
        let timestamps: Vec<i64> = self.field("history", "/timestamp")?.unwrap_or_default();
        if timestamps.is_empty() {
            return Ok(Vec::new());
        }

        let indicators: Indicators = self
            .field("history", "/indicators")?
            .ok_or_else(|| FinvError::parse("history", "indicators are missing"))?;
        let series = indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FinvError::parse("history", "indicators.quote is empty"))?;
        let adjclose = indicators
            .adjclose
            .and_then(|a| a.into_iter().next())
            .map(|a| a.adjclose);

        let mut lengths = vec![
            timestamps.len(),
            series.open.len(),
            series.close.len(),
            series.high.len(),
            series.low.len(),
            series.volume.len(),
        ];
        if let Some(adj) = &adjclose {
            lengths.push(adj.len());
        }
        let count = lengths.iter().copied().min().unwrap_or(0);
        if lengths.iter().any(|&len| len != count) {
            warn!(
                "History series lengths differ ({:?}); keeping the first {} records",
                lengths, count
            );
        }

        let mut history = Vec::with_capacity(count);
        for (i, &timestamp) in timestamps.iter().take(count).enumerate() {
            history.push(HistoricalQuote {
                date: from_unix_seconds("history", timestamp)?,
                open: decimal_or_zero(series.open[i]),
                close: decimal_or_zero(series.close[i]),
                adj_close: decimal_or_zero(adjclose.as_ref().and_then(|a| a[i])),
                low: decimal_or_zero(series.low[i]),
                high: decimal_or_zero(series.high[i]),
                volume: integer_or_zero(series.volume[i]),
            });
        }
        Ok(history)
    }

    /// Dividends in ascending date order. Absent `events.dividends` yields none.
    pub fn dividends(&self) -> Result<Vec<Dividend>, FinvError> {
        let nodes: HashMap<String, DividendNode> = self
            .field("dividends", "/events/dividends")?
            .unwrap_or_default();

        let mut dividends = nodes
            .into_iter()
            .map(|(key, node)| {
                Ok(Dividend {
                    amount: decimal_or_zero(node.amount),
                    date: event_date("dividends", &key)?,
                })
            })
            .collect::<Result<Vec<_>, FinvError>>()?;
        dividends.sort_by_key(|d| d.date);
        Ok(dividends)
    }

    /// Splits in ascending date order. Absent `events.splits` yields none.
    pub fn splits(&self) -> Result<Vec<Split>, FinvError> {
        let nodes: HashMap<String, SplitNode> =
            self.field("splits", "/events/splits")?.unwrap_or_default();

        let mut splits = nodes
            .into_iter()
            .map(|(key, node)| {
                Ok(Split {
                    ratio: node.split_ratio,
                    date: event_date("splits", &key)?,
                })
            })
            .collect::<Result<Vec<_>, FinvError>>()?;
        splits.sort_by_key(|s| s.date);
        Ok(splits)
    }
}

/// Event maps are keyed by the event's Unix timestamp in seconds.
fn event_date(
    context: &'static str,
    key: &str,
) -> Result<chrono::DateTime<chrono::Utc>, FinvError> {
    let seconds = key
        .parse::<i64>()
        .map_err(|_| FinvError::parse(context, format!("event key is not a timestamp: {}", key)))?;
    from_unix_seconds(context, seconds)
}

pub fn try_parse_history(body: &str) -> Result<Vec<HistoricalQuote>, FinvError> {
    ChartDocument::parse(body)?.history()
}

pub fn try_parse_dividends(body: &str) -> Result<Vec<Dividend>, FinvError> {
    ChartDocument::parse(body)?.dividends()
}

pub fn try_parse_splits(body: &str) -> Result<Vec<Split>, FinvError> {
    ChartDocument::parse(body)?.splits()
}

/// History records, or none when the body cannot be parsed.
pub fn parse_history(body: &str) -> Vec<HistoricalQuote> {
    try_parse_history(body).unwrap_or_else(|e| {
        warn!("Discarding history: {}", e);
        Vec::new()
    })
}

/// Dividend records, or none when the body cannot be parsed.
pub fn parse_dividends(body: &str) -> Vec<Dividend> {
    try_parse_dividends(body).unwrap_or_else(|e| {
        warn!("Discarding dividends: {}", e);
        Vec::new()
    })
}

/// Split records, or none when the body cannot be parsed.
pub fn parse_splits(body: &str) -> Vec<Split> {
    try_parse_splits(body).unwrap_or_else(|e| {
        warn!("Discarding splits: {}", e);
        Vec::new()
    })
}
