//! The `StockDataProvider` trait implemented by each data kind.

use crate::auth::Credentials;
use crate::errors::FinvError;
use crate::http::QueryParams;
use crate::models::Instrument;

/// How a provider treats a body it cannot parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Log the failure and degrade to absent or empty data.
    #[default]
    Lenient,
    /// Return the failure to the caller and leave the instrument untouched.
    Strict,
}

/// One kind of data fetched for an instrument.
///
/// A provider knows where its data lives and how to read it back; fetching is
/// shared and lives in [`super::fetch_data`].
pub trait StockDataProvider: Send + Sync {
    /// Short name used in log messages (e.g. "profile").
    fn name(&self) -> &'static str;

    /// Endpoint URL for `instrument`, without query parameters.
    fn api_url(&self, instrument: &Instrument) -> String;

    /// Whether requests need the session cookie and crumb.
    fn requires_auth(&self) -> bool {
        false
    }

    /// Query parameters in the order they are sent.
    ///
    /// `credentials` is `Some` exactly when [`Self::requires_auth`] is true.
    fn request_parameters(&self, credentials: Option<&Credentials>) -> QueryParams;

    /// Populate the fields this provider owns from a successful response.
    ///
    /// Fields owned by other providers are never touched.
    fn parse(&self, body: &str, instrument: &mut Instrument, mode: ParseMode)
        -> Result<(), FinvError>;
}

/// `<base>/<SYMBOL>` with the symbol percent-encoded as a path segment.
pub(crate) fn symbol_url(base: &str, instrument: &Instrument) -> String {
    let symbol = urlencoding::encode(instrument.symbol());
    if base.ends_with('/') {
        format!("{}{}", base, symbol)
    } else {
        format!("{}/{}", base, symbol)
    }
}
