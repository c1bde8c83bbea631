//! The `Finv` client: one entry point over the providers, statistics and export.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::config::FinvConfig;
use crate::errors::FinvError;
use crate::export::{self, ExportFormat};
use crate::http::{HttpFetcher, HttpTransport, ReqwestTransport};
use crate::models::{EventsRequest, Instrument};
use crate::provider::{
    fetch_data, EventsProvider, ParseMode, ProfileProvider, QuoteProvider, StockDataProvider,
};
use crate::stats::{self, Statistic};

/// Client for instrument data.
///
/// Cloning is cheap; clones share the HTTP transport and the cached cookie
/// and crumb.
///
/// Operations without a `try_` prefix never fail because of the provider:
/// failures are logged and the affected fields stay absent. The `try_`
/// variants return the first failure instead.
#[derive(Clone)]
pub struct Finv {
    config: Arc<FinvConfig>,
    auth: Arc<AuthSession>,
    fetcher: HttpFetcher,
}

impl Finv {
    /// Client backed by a real HTTP transport.
    pub fn new(config: FinvConfig) -> Result<Self, FinvError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client using the configuration from the environment.
    pub fn from_env() -> Result<Self, FinvError> {
        Self::new(FinvConfig::from_env())
    }

    /// Client backed by any transport, for tests and custom HTTP stacks.
    pub fn with_transport(config: FinvConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let auth = AuthSession::from_config(transport.clone(), &config);
        let fetcher = HttpFetcher::new(transport, config.timeout);
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            fetcher,
        }
    }

    pub fn config(&self) -> &FinvConfig {
        &self.config
    }

    /// The shared authentication session.
    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    async fn run(
        &self,
        provider: &dyn StockDataProvider,
        instrument: &mut Instrument,
        mode: ParseMode,
    ) -> Result<(), FinvError> {
        fetch_data(provider, instrument, &self.fetcher, &self.auth, mode).await
    }

    /// Run a provider, logging a failure instead of returning it.
    async fn run_lenient(&self, provider: &dyn StockDataProvider, instrument: &mut Instrument) {
        if let Err(e) = self.run(provider, instrument, ParseMode::Lenient).await {
            warn!(
                "Failed to load {} for {}: {}",
                provider.name(),
                instrument.symbol(),
                e
            );
        }
    }

    fn profile_provider(&self) -> ProfileProvider {
        ProfileProvider::new(self.config.options_url.as_str())
    }

    fn quote_provider(&self) -> QuoteProvider {
        QuoteProvider::new(self.config.options_url.as_str())
    }

    fn events_provider(&self, request: &EventsRequest) -> EventsProvider {
        EventsProvider::new(self.config.chart_url.as_str(), request.clone())
    }

    /// Profile and quote for `symbol`.
    ///
    /// Fails only for a blank symbol.
    pub async fn get(&self, symbol: &str) -> Result<Instrument, FinvError> {
        let mut instrument = Instrument::new(symbol)?;
        self.run_lenient(&self.profile_provider(), &mut instrument).await;
        self.run_lenient(&self.quote_provider(), &mut instrument).await;
        Ok(instrument)
    }

    pub async fn try_get(&self, symbol: &str) -> Result<Instrument, FinvError> {
        let mut instrument = Instrument::new(symbol)?;
        self.run(&self.profile_provider(), &mut instrument, ParseMode::Strict)
            .await?;
        self.run(&self.quote_provider(), &mut instrument, ParseMode::Strict)
            .await?;
        Ok(instrument)
    }

    /// Profile, quote and the requested events for `symbol`.
    pub async fn get_with_events(
        &self,
        symbol: &str,
        request: &EventsRequest,
    ) -> Result<Instrument, FinvError> {
        let mut instrument = self.get(symbol).await?;
        self.populate_events(&mut instrument, request).await;
        Ok(instrument)
    }

    pub async fn try_get_with_events(
        &self,
        symbol: &str,
        request: &EventsRequest,
    ) -> Result<Instrument, FinvError> {
        let mut instrument = self.try_get(symbol).await?;
        self.try_populate_events(&mut instrument, request).await?;
        Ok(instrument)
    }

    /// Fetch several symbols concurrently.
    ///
    /// Symbols are trimmed and de-duplicated, keeping the first occurrence's
    /// position; blank symbols are skipped. Events are fetched when `request`
    /// is given.
    pub async fn get_many<S: AsRef<str>>(
        &self,
        symbols: &[S],
        request: Option<&EventsRequest>,
    ) -> Vec<Instrument> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = symbols
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && seen.insert(*s))
            .collect();
        debug!("Fetching {} instruments", unique.len());

        let fetches = unique.into_iter().map(|symbol| async move {
            match request {
                Some(request) => self.get_with_events(symbol, request).await,
                None => self.get(symbol).await,
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    /// Refresh the quote of an existing instrument.
    pub async fn populate_quote(&self, instrument: &mut Instrument) {
        self.run_lenient(&self.quote_provider(), instrument).await;
    }

    pub async fn try_populate_quote(&self, instrument: &mut Instrument) -> Result<(), FinvError> {
        self.run(&self.quote_provider(), instrument, ParseMode::Strict)
            .await
    }

    /// Fetch the requested events into an existing instrument.
    pub async fn populate_events(&self, instrument: &mut Instrument, request: &EventsRequest) {
        self.run_lenient(&self.events_provider(request), instrument)
            .await;
    }

    pub async fn try_populate_events(
        &self,
        instrument: &mut Instrument,
        request: &EventsRequest,
    ) -> Result<(), FinvError> {
        self.run(&self.events_provider(request), instrument, ParseMode::Strict)
            .await
    }

    pub fn stats(&self, instrument: &Instrument, statistic: Statistic) -> Decimal {
        stats::calculate(instrument, statistic)
    }

    pub fn stats_list(&self, instrument: &Instrument, statistics: &[Statistic]) -> Vec<Decimal> {
        stats::calculate_all(instrument, statistics)
    }

    /// Write `instrument` to `<dir>/<SYMBOL>.<ext>`.
    pub fn export(
        &self,
        instrument: &Instrument,
        format: ExportFormat,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, FinvError> {
        export::export(instrument, format, dir)
    }
}
