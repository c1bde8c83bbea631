//! Instrument data model
//!
//! This module contains the domain types populated by the providers:
//! - `instrument` - The `Instrument` aggregate root
//! - `quote` - Snapshot quote and historical daily records
//! - `events` - Dividend and split records
//! - `request` - Event kinds, sampling frequencies and the events request

mod events;
mod instrument;
mod quote;
mod request;

pub use events::{Dividend, Split};
pub use instrument::Instrument;
pub use quote::{HistoricalQuote, Quote};
pub use request::{Event, EventsRequest, Frequency};
