//! Finv - instrument data from the Yahoo Finance HTTP API.
//!
//! This crate fetches profiles, quotes, price history, dividends and splits for
//! ticker symbols, and computes a few statistics over the result.
//!
//! # Architecture
//!
//! ```text
//! Finv (client facade)
//!   ├── ProfileProvider / QuoteProvider  -> options endpoint (cookie + crumb)
//!   ├── EventsProvider                   -> chart endpoint
//!   ├── AuthSession                      -> cached cookie and crumb
//!   └── HttpFetcher -> HttpTransport     -> reqwest, or a mock in tests
//! ```
//!
//! Providers share one flow: build the URL, attach headers, fetch, parse into
//! the [`Instrument`]. Parsing is pure and lives in [`parser`].
//!
//! # Example
//!
//! ```ignore
//! use finv::{Event, EventsRequest, Finv, Statistic};
//!
//! let finv = Finv::from_env()?;
//! let request = EventsRequest::last_year(vec![Event::History, Event::Dividends]);
//! let instrument = finv.get_with_events("KO", &request).await?;
//! println!("{}", instrument);
//! println!("yield: {}", finv.stats(&instrument, Statistic::DividendYield));
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod export;
pub mod http;
pub mod models;
pub mod parser;
pub mod provider;
pub mod stats;

pub use auth::{AuthSession, Credentials};
pub use client::Finv;
pub use config::FinvConfig;
pub use errors::FinvError;
pub use export::ExportFormat;
pub use http::{HttpTransport, ReqwestTransport};
pub use models::{
    Dividend, Event, EventsRequest, Frequency, HistoricalQuote, Instrument, Quote, Split,
};
pub use stats::Statistic;
