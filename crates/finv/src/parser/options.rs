//! Parsing of the options endpoint (`optionChain.result[0].quote`).

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{decimal_or_zero, from_unix_seconds, integer_or_zero};
use crate::errors::FinvError;
use crate::models::{Instrument, Quote};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: OptionChain,
}

#[derive(Deserialize)]
struct OptionChain {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// The quote node as sent by the provider. Every field may be absent.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct QuoteNode {
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    full_exchange_name: Option<String>,
    exchange: Option<String>,
    market_state: Option<String>,
    quote_type: Option<String>,
    region: Option<String>,
    exchange_timezone_name: Option<String>,
    quote_source_name: Option<String>,

    regular_market_time: Option<i64>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_volume: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

/// Descriptive fields of an instrument.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub market_state: Option<String>,
    pub quote_type: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub quote_source: Option<String>,
}

impl Profile {
    /// Copy every field that was present onto `instrument`.
    pub fn apply_to(self, instrument: &mut Instrument) {
        let Profile {
            name,
            currency,
            exchange,
            market_state,
            quote_type,
            region,
            timezone,
            quote_source,
        } = self;

        if name.is_some() {
            instrument.name = name;
        }
        if currency.is_some() {
            instrument.currency = currency;
        }
        if exchange.is_some() {
            instrument.exchange = exchange;
        }
        if market_state.is_some() {
            instrument.market_state = market_state;
        }
        if quote_type.is_some() {
            instrument.quote_type = quote_type;
        }
        if region.is_some() {
            instrument.region = region;
        }
        if timezone.is_some() {
            instrument.timezone = timezone;
        }
        if quote_source.is_some() {
            instrument.quote_source = quote_source;
        }
    }
}

fn quote_node(context: &'static str, body: &str) -> Result<QuoteNode, FinvError> {
    let response: OptionsResponse =
        serde_json::from_str(body).map_err(|e| FinvError::parse(context, e.to_string()))?;

    let first = match response.option_chain.result.into_iter().next() {
        Some(first) => first,
        None => {
            let reason = response
                .option_chain
                .error
                .filter(|e| !e.is_null())
                .map(|e| e.to_string())
                .unwrap_or_else(|| "optionChain.result is empty".to_string());
            return Err(FinvError::parse(context, reason));
        }
    };

    let quote = first
        .get("quote")
        .filter(|q| q.is_object())
        .cloned()
        .ok_or_else(|| FinvError::parse(context, "optionChain.result[0].quote is missing"))?;

    serde_json::from_value(quote).map_err(|e| FinvError::parse(context, e.to_string()))
}

/// Profile fields from an options response.
///
/// The name falls back to the short name, the exchange to the exchange code.
pub fn try_parse_profile(body: &str) -> Result<Profile, FinvError> {
    let node = quote_node("profile", body)?;
    Ok(Profile {
        name: node.long_name.or(node.short_name),
        currency: node.currency,
        exchange: node.full_exchange_name.or(node.exchange),
        market_state: node.market_state,
        quote_type: node.quote_type,
        region: node.region,
        timezone: node.exchange_timezone_name,
        quote_source: node.quote_source_name,
    })
}

/// Quote from an options response. Absent prices and volume become zero.
pub fn try_parse_quote(body: &str) -> Result<Quote, FinvError> {
    let node = quote_node("quote", body)?;
    let market_time = node
        .regular_market_time
        .map(|secs| from_unix_seconds("quote", secs))
        .transpose()?;

    Ok(Quote {
        market_time,
        price: decimal_or_zero(node.regular_market_price),
        change: decimal_or_zero(node.regular_market_change),
        open: decimal_or_zero(node.regular_market_open),
        previous_close: decimal_or_zero(node.regular_market_previous_close),
        day_low: decimal_or_zero(node.regular_market_day_low),
        day_high: decimal_or_zero(node.regular_market_day_high),
        volume: integer_or_zero(node.regular_market_volume),
        bid: decimal_or_zero(node.bid),
        ask: decimal_or_zero(node.ask),
    })
}

pub fn parse_profile(body: &str) -> Option<Profile> {
    try_parse_profile(body)
        .inspect_err(|e| warn!("Discarding profile: {}", e))
        .ok()
}

pub fn parse_quote(body: &str) -> Option<Quote> {
    try_parse_quote(body)
        .inspect_err(|e| warn!("Discarding quote: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const AAPL: &str = r#"{
        "optionChain": {
            "result": [{
                "underlyingSymbol": "AAPL",
                "quote": {
                    "symbol": "AAPL",
                    "longName": "Apple Inc.",
                    "shortName": "Apple",
                    "currency": "USD",
                    "fullExchangeName": "NasdaqGS",
                    "exchange": "NMS",
                    "marketState": "REGULAR",
                    "quoteType": "EQUITY",
                    "region": "US",
                    "exchangeTimezoneName": "America/New_York",
                    "quoteSourceName": "Nasdaq Real Time Price",
                    "regularMarketTime": 1704205800,
                    "regularMarketPrice": 150.25,
                    "regularMarketChange": -1.5,
                    "regularMarketOpen": 151.0,
                    "regularMarketPreviousClose": 151.75,
                    "regularMarketDayLow": 149.8,
                    "regularMarketDayHigh": 152.1,
                    "regularMarketVolume": 48087681,
                    "bid": 150.2,
                    "ask": 150.3
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_profile() {
        let profile = try_parse_profile(AAPL).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Apple Inc."));
        assert_eq!(profile.currency.as_deref(), Some("USD"));
        assert_eq!(profile.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(profile.market_state.as_deref(), Some("REGULAR"));
        assert_eq!(profile.quote_type.as_deref(), Some("EQUITY"));
        assert_eq!(profile.region.as_deref(), Some("US"));
        assert_eq!(profile.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(profile.quote_source.as_deref(), Some("Nasdaq Real Time Price"));
    }

    #[test]
    fn test_parse_quote() {
        let quote = try_parse_quote(AAPL).unwrap();
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.change, dec!(-1.5));
        assert_eq!(quote.open, dec!(151));
        assert_eq!(quote.previous_close, dec!(151.75));
        assert_eq!(quote.day_low, dec!(149.8));
        assert_eq!(quote.day_high, dec!(152.1));
        assert_eq!(quote.volume, 48_087_681);
        assert_eq!(quote.bid, dec!(150.2));
        assert_eq!(quote.ask, dec!(150.3));
        assert_eq!(
            quote.market_time.unwrap().to_rfc3339(),
            "2024-01-02T14:30:00+00:00"
        );
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let body = r#"{"optionChain":{"result":[{"quote":{"regularMarketPrice":10.5}}]}}"#;
        let quote = try_parse_quote(body).unwrap();
        assert_eq!(quote.price, dec!(10.5));
        assert_eq!(quote.bid, Decimal::ZERO);
        assert_eq!(quote.volume, 0);
        assert!(quote.market_time.is_none());
    }

    #[test]
    fn test_profile_fallbacks() {
        let body = r#"{"optionChain":{"result":[{"quote":{"shortName":"Apple","exchange":"NMS"}}]}}"#;
        let profile = try_parse_profile(body).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Apple"));
        assert_eq!(profile.exchange.as_deref(), Some("NMS"));
        assert!(profile.currency.is_none());
    }

    #[test]
    fn test_apply_keeps_existing_when_absent() {
        let mut instrument = Instrument::new("AAPL").unwrap();
        instrument.region = Some("US".to_string());
        Profile {
            name: Some("Apple Inc.".to_string()),
            ..Profile::default()
        }
        .apply_to(&mut instrument);
        assert_eq!(instrument.name.as_deref(), Some("Apple Inc."));
        assert_eq!(instrument.region.as_deref(), Some("US"));
    }

    #[test]
    fn test_empty_result_is_error() {
        let body = r#"{"optionChain":{"result":[],"error":null}}"#;
        let err = try_parse_quote(body).unwrap_err();
        assert!(matches!(err, FinvError::Parse { context: "quote", .. }));
        assert!(parse_quote(body).is_none());
    }

    #[test]
    fn test_provider_error_is_reported() {
        let body = r#"{"optionChain":{"result":[],"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;
        let err = try_parse_profile(body).unwrap_err();
        assert!(err.to_string().contains("Invalid Crumb"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(parse_profile("not json").is_none());
        assert!(parse_quote("").is_none());
        assert!(try_parse_quote(r#"{"optionChain":{"result":[{}]}}"#).is_err());
    }

    #[test]
    fn test_wrong_type_fails_whole_quote() {
        let body = r#"{"optionChain":{"result":[{"quote":{"regularMarketPrice":"n/a"}}]}}"#;
        assert!(try_parse_quote(body).is_err());
    }
}
