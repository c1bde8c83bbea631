use tracing::info;

use super::traits::{symbol_url, ParseMode, StockDataProvider};
use crate::auth::Credentials;
use crate::errors::FinvError;
use crate::http::QueryParams;
use crate::models::Instrument;
use crate::parser::{parse_profile, try_parse_profile};

/// Fills the descriptive fields (name, currency, exchange, ...) from the options endpoint.
#[derive(Clone, Debug)]
pub struct ProfileProvider {
    base_url: String,
}

impl ProfileProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl StockDataProvider for ProfileProvider {
    fn name(&self) -> &'static str {
        "profile"
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
        let profile = match mode {
            ParseMode::Strict => Some(try_parse_profile(body)?),
            ParseMode::Lenient => parse_profile(body),
        };
        if let Some(profile) = profile {
            profile.apply_to(instrument);
            info!("Loaded profile for {}", instrument.symbol());
        }
        Ok(())
    }
}

/// `crumb=<crumb>` when credentials are available.
pub(super) fn crumb_parameter(credentials: Option<&Credentials>) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(credentials) = credentials {
        params.insert("crumb", credentials.crumb.as_str());
    }
    params
}
