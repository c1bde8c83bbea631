use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FinvError;

/// Category of time-series data served by the chart endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    History,
    Dividends,
    Splits,
}

impl Event {
    /// Value used in the `events` query parameter.
    pub fn as_api_value(&self) -> &'static str {
        match self {
            Event::History => "history",
            Event::Dividends => "div",
            Event::Splits => "split",
        }
    }

    pub fn all() -> [Event; 3] {
        [Event::History, Event::Dividends, Event::Splits]
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_value())
    }
}

impl FromStr for Event {
    type Err = FinvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "history" => Ok(Event::History),
            "div" | "dividend" | "dividends" => Ok(Event::Dividends),
            "split" | "splits" => Ok(Event::Splits),
            other => Err(FinvError::InvalidInput(format!("unknown event: {}", other))),
        }
    }
}

/// Sampling interval of a chart request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Yearly,
    Biennial,
    Quinquennial,
    Decennial,
    YearToDate,
    Maximum,
}

impl Frequency {
    /// Value used in the `interval` query parameter.
    pub fn as_api_value(&self) -> &'static str {
        match self {
            Frequency::Daily => "1d",
            Frequency::Weekly => "5d",
            Frequency::Monthly => "1mo",
            Frequency::Quarterly => "3mo",
            Frequency::SemiAnnual => "6mo",
            Frequency::Yearly => "1y",
            Frequency::Biennial => "2y",
            Frequency::Quinquennial => "5y",
            Frequency::Decennial => "10y",
            Frequency::YearToDate => "ytd",
            Frequency::Maximum => "max",
        }
    }

    const ALL: [Frequency; 11] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::SemiAnnual,
        Frequency::Yearly,
        Frequency::Biennial,
        Frequency::Quinquennial,
        Frequency::Decennial,
        Frequency::YearToDate,
        Frequency::Maximum,
    ];
}

impl FromStr for Frequency {
    type Err = FinvError;

    /// Accepts the API value (`1d`, `1mo`, ...) or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        Frequency::ALL
            .into_iter()
            .find(|f| {
                f.as_api_value() == needle
                    || format!("{:?}", f).to_ascii_lowercase() == needle
            })
            .ok_or_else(|| FinvError::InvalidInput(format!("unknown interval: {}", s)))
    }
}

/// Parameters of a chart request: which events, over which range, at which interval.
#[derive(Clone, Debug, PartialEq)]
pub struct EventsRequest {
    pub events: Vec<Event>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
}

impl EventsRequest {
    pub fn new(events: Vec<Event>, start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Self {
        Self {
            events,
            start,
            end,
            frequency,
        }
    }

    /// The twelve months ending today, sampled daily.
    pub fn last_year(events: Vec<Event>) -> Self {
        let end = Utc::now().date_naive();
        let start = end.checked_sub_months(Months::new(12)).unwrap_or(end);
        Self::new(events, start, end, Frequency::Daily)
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Requested events joined with `|`, in request order (e.g. `div|split|history`).
    pub fn events_param(&self) -> String {
        self.events
            .iter()
            .map(Event::as_api_value)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Unix seconds of the start date at midnight UTC.
    pub fn period1(&self) -> i64 {
        midnight_utc(self.start)
    }

    /// Unix seconds of the end date at midnight UTC.
    pub fn period2(&self) -> i64 {
        midnight_utc(self.end)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
