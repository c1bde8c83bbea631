use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use finv::{Event, EventsRequest, ExportFormat, Finv, Frequency, Instrument, Statistic};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`, else `default_level`. `FINV_LOG_FORMAT=json`
/// switches to JSON lines. Logs go to stderr so the dump on stdout stays clean.
pub fn init_tracing(default_level: &str) {
    let log_format = std::env::var("FINV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// What to fetch and what to do with it, independent of argument parsing.
#[derive(Debug, Clone)]
pub struct Job {
    pub symbols: Vec<String>,
    pub events: Option<EventsRequest>,
    pub stats: Vec<Statistic>,
    pub export: Option<ExportFormat>,
    pub out: PathBuf,
    pub strict: bool,
}

/// The chart request implied by the options, if any.
///
/// A request is made when events are listed or a date bound is given; in the
/// latter case all events are fetched. Missing bounds default to the last year.
pub fn events_request(
    events: &[Event],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    interval: Frequency,
) -> Result<Option<EventsRequest>> {
    if events.is_empty() && start.is_none() && end.is_none() {
        return Ok(None);
    }

    let events = if events.is_empty() {
        Event::all().to_vec()
    } else {
        events.to_vec()
    };

    let mut request = EventsRequest::last_year(events).with_frequency(interval);
    if let Some(start) = start {
        request.start = start;
    }
    if let Some(end) = end {
        request.end = end;
    }
    if request.start > request.end {
        bail!("start date {} is after end date {}", request.start, request.end);
    }
    Ok(Some(request))
}

async fn fetch(finv: &Finv, job: &Job) -> Result<Vec<Instrument>> {
    if !job.strict {
        return Ok(finv.get_many(&job.symbols, job.events.as_ref()).await);
    }

    let mut instruments = Vec::with_capacity(job.symbols.len());
    for symbol in &job.symbols {
        let instrument = match &job.events {
            Some(request) => finv.try_get_with_events(symbol, request).await?,
            None => finv.try_get(symbol).await?,
        };
        instruments.push(instrument);
    }
    Ok(instruments)
}

/// Fetch, print, compute statistics and export.
pub async fn run(finv: &Finv, job: &Job) -> Result<()> {
    let instruments = fetch(finv, job).await?;
    if instruments.is_empty() {
        bail!("no instruments were fetched");
    }

    for instrument in &instruments {
        println!("{}", instrument);

        if !job.stats.is_empty() {
            let values = finv.stats_list(instrument, &job.stats);
            println!("statistics:");
            for (statistic, value) in job.stats.iter().zip(values) {
                println!("  {}: {}", statistic, value.round_dp(4));
            }
        }

        if let Some(format) = job.export {
            let path = finv.export(instrument, format, &job.out)?;
            println!("exported: {}", path.display());
        }
        println!();
    }
    Ok(())
}
