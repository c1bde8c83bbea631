use tracing::{info, warn};

use super::traits::{symbol_url, ParseMode, StockDataProvider};
use crate::auth::Credentials;
use crate::errors::FinvError;
use crate::http::QueryParams;
use crate::models::{Dividend, Event, EventsRequest, HistoricalQuote, Instrument, Split};
use crate::parser::ChartDocument;

/// Fills history, dividends and splits from a single chart request.
///
/// Only the events named in the request are parsed and stored.
#[derive(Clone, Debug)]
pub struct EventsProvider {
    base_url: String,
    request: EventsRequest,
}

#[derive(Default)]
struct Extracted {
    history: Option<Vec<HistoricalQuote>>,
    dividends: Option<Vec<Dividend>>,
    splits: Option<Vec<Split>>,
}

impl EventsProvider {
    pub fn new(base_url: impl Into<String>, request: EventsRequest) -> Self {
        Self {
            base_url: base_url.into(),
            request,
        }
    }

    fn extract(&self, body: &str) -> Result<Extracted, FinvError> {
        let document = ChartDocument::parse(body)?;
        let mut extracted = Extracted::default();
        for event in &self.request.events {
            match event {
                Event::History => extracted.history = Some(document.history()?),
                Event::Dividends => extracted.dividends = Some(document.dividends()?),
                Event::Splits => extracted.splits = Some(document.splits()?),
            }
        }
        Ok(extracted)
    }

    /// Each requested event on its own; a failure empties only that event.
    fn extract_lenient(&self, symbol: &str, body: &str) -> Extracted {
        let document = match ChartDocument::parse(body) {
            Ok(document) => Some(document),
            Err(e) => {
                warn!("Discarding chart data for {}: {}", symbol, e);
                None
            }
        };

        let document = document.as_ref();
        let mut extracted = Extracted::default();
        for &event in &self.request.events {
            match event {
                Event::History => {
                    let result = document.map(ChartDocument::history);
                    extracted.history = Some(or_empty(symbol, event, result));
                }
                Event::Dividends => {
                    let result = document.map(ChartDocument::dividends);
                    extracted.dividends = Some(or_empty(symbol, event, result));
                }
                Event::Splits => {
                    let result = document.map(ChartDocument::splits);
                    extracted.splits = Some(or_empty(symbol, event, result));
                }
            }
        }
        extracted
    }
}

fn or_empty<T>(symbol: &str, event: Event, result: Option<Result<Vec<T>, FinvError>>) -> Vec<T> {
    match result {
        Some(Ok(records)) => records,
        Some(Err(e)) => {
            warn!("Discarding {} for {}: {}", event, symbol, e);
            Vec::new()
        }
        None => Vec::new(),
    }
}

impl StockDataProvider for EventsProvider {
    fn name(&self) -> &'static str {
        "events"
    }

    fn api_url(&self, instrument: &Instrument) -> String {
        symbol_url(&self.base_url, instrument)
    }

    fn request_parameters(&self, _credentials: Option<&Credentials>) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("period1", self.request.period1().to_string());
        params.insert("period2", self.request.period2().to_string());
        params.insert("interval", self.request.frequency.as_api_value());
        params.insert("events", self.request.events_param());
        params.insert("includeAdjustedClose", "true");
        params
    }

    fn parse(
        &self,
        body: &str,
        instrument: &mut Instrument,
        mode: ParseMode,
    ) -> Result<(), FinvError> {
        let extracted = match mode {
            ParseMode::Strict => self.extract(body)?,
            ParseMode::Lenient => self.extract_lenient(instrument.symbol(), body),
        };

        if let Some(history) = extracted.history {
            instrument.history = Some(history);
        }
        if let Some(dividends) = extracted.dividends {
            instrument.dividends = Some(dividends);
        }
        if let Some(splits) = extracted.splits {
            instrument.splits = Some(splits);
        }

        info!(
            "Loaded events for {}: {} history, {} dividends, {} splits",
            instrument.symbol(),
            instrument.history().len(),
            instrument.dividends().len(),
            instrument.splits().len()
        );
        Ok(())
    }
}
