//! finv - print instrument data, statistics and exports from the command line.

mod main_lib;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use finv::{Event, ExportFormat, Finv, FinvConfig, Frequency, Statistic};
use main_lib::{events_request, init_tracing, run, Job};

#[derive(Parser)]
#[command(name = "finv", version, about = "Fetch quotes, history and dividends for ticker symbols")]
struct Cli {
    /// Symbols to fetch (e.g. AAPL KO ^GSPC).
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Events to fetch from the chart endpoint: history, div, split.
    #[arg(long, value_delimiter = ',')]
    events: Vec<Event>,

    /// Start date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Sampling interval: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max.
    #[arg(long, default_value = "1d")]
    interval: Frequency,

    /// Statistics to print: avg, total-div, max, min, yield.
    #[arg(long, value_delimiter = ',')]
    stats: Vec<Statistic>,

    /// Export each instrument as json or xml.
    #[arg(long)]
    export: Option<ExportFormat>,

    /// Export directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Fail on the first provider error instead of printing partial data.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = FinvConfig::from_env();
    init_tracing(&config.log_level);

    let job = Job {
        events: events_request(&cli.events, cli.start, cli.end, cli.interval)?,
        symbols: cli.symbols,
        stats: cli.stats,
        export: cli.export,
        out: cli.out,
        strict: cli.strict,
    };
    tracing::debug!("Running {:?}", job);

    let finv = Finv::new(config)?;
    run(&finv, &job).await
}
