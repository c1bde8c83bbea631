//! Data providers and the shared fetch-and-populate flow.
//!
//! This module contains:
//! - The `StockDataProvider` trait implemented by every data kind
//! - `ProfileProvider` and `QuoteProvider` for the options endpoint
//! - `EventsProvider` for history, dividends and splits from the chart endpoint
//!
//! [`fetch_data`] builds the URL, attaches the standard headers (plus the
//! session cookie for providers that need it), performs the GET and hands the
//! body to the provider's parser.

mod events;
mod profile;
mod quote;
mod traits;

use tracing::debug;

use crate::auth::AuthSession;
use crate::errors::FinvError;
use crate::http::headers::data_headers;
use crate::http::{HttpFetcher, RequestBuilder};
use crate::models::Instrument;

pub use events::EventsProvider;
pub use profile::ProfileProvider;
pub use quote::QuoteProvider;
pub use traits::{ParseMode, StockDataProvider};

/// Fetch the provider's data for `instrument` and populate it.
///
/// Any failure before parsing (credentials, transport, status) is returned and
/// the instrument is left as it was. Parse failures follow `mode`.
pub async fn fetch_data(
    provider: &dyn StockDataProvider,
    instrument: &mut Instrument,
    fetcher: &HttpFetcher,
    auth: &AuthSession,
    mode: ParseMode,
) -> Result<(), FinvError> {
    let credentials = if provider.requires_auth() {
        Some(auth.credentials().await?)
    } else {
        None
    };

    let url = RequestBuilder::new(provider.api_url(instrument))
        .params(&provider.request_parameters(credentials.as_ref()))
        .build();
    let headers = data_headers(credentials.as_ref().map(|c| c.cookie.as_str()));

    debug!("Fetching {} for {}", provider.name(), instrument.symbol());
    let body = fetcher.fetch(&url, headers).await?;

    provider.parse(&body, instrument, mode)
}
