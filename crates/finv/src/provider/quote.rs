use tracing::info;

use super::profile::crumb_parameter;
use super::traits::{symbol_url, ParseMode, StockDataProvider};
use crate::auth::Credentials;
use crate::errors::FinvError;
use crate::http::QueryParams;
use crate::models::Instrument;
use crate::parser::{parse_quote, try_parse_quote};

/// Fills the current quote from the options endpoint.
#[derive(Clone, Debug)]
pub struct QuoteProvider {
    base_url: String,
}

impl QuoteProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl StockDataProvider for QuoteProvider {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn api_url(&self, instrument: &Instrument) -> String {
        symbol_url(&self.base_url, instrument)
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn request_parameters(&self, credentials: Option<&Credentials>) -> QueryParams {
        crumb_parameter(credentials)
    }

    fn parse(
        &self,
        body: &str,
        instrument: &mut Instrument,
        mode: ParseMode,
    ) -> Result<(), FinvError> {
        let quote = match mode {
            ParseMode::Strict => Some(try_parse_quote(body)?),
            ParseMode::Lenient => parse_quote(body),
        };
        if let Some(quote) = quote {
            info!("Loaded quote for {}: {}", instrument.symbol(), quote.price);
            instrument.quote = Some(quote);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_populates_quote() {
        let body = r#"{"optionChain":{"result":[{"quote":{"regularMarketPrice":150.25,"regularMarketPreviousClose":100}}]}}"#;
        let provider = QuoteProvider::new("https://q/");
        let mut instrument = Instrument::new("AAPL").unwrap();
        provider.parse(body, &mut instrument, ParseMode::Lenient).unwrap();

        let quote = instrument.quote.unwrap();
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.previous_close, dec!(100));
        assert!(instrument.name.is_none());
    }

    #[test]
    fn test_lenient_failure_keeps_previous_quote() {
        let provider = QuoteProvider::new("https://q/");
        let mut instrument = Instrument::new("AAPL").unwrap();
        instrument.quote = Some(Default::default());
        provider.parse("oops", &mut instrument, ParseMode::Lenient).unwrap();
        assert!(instrument.quote.is_some());
    }
}
