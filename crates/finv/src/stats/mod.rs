//! Derived statistics over a populated [`Instrument`].
//!
//! Every calculator is a pure function returning zero when the data it needs
//! is missing.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::FinvError;
use crate::models::Instrument;

type Calculator = fn(&Instrument) -> Decimal;

/// A statistic that can be computed from an instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statistic {
    /// Mean closing price over the history
    AverageClosePrice,
    /// Sum of all dividend amounts
    TotalDividends,
    MaxClosingPrice,
    MinClosingPrice,
    /// Annualized dividend yield in percent
    DividendYield,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::AverageClosePrice,
        Statistic::TotalDividends,
        Statistic::MaxClosingPrice,
        Statistic::MinClosingPrice,
        Statistic::DividendYield,
    ];

    /// Short name accepted on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            Statistic::AverageClosePrice => "avg",
            Statistic::TotalDividends => "total-div",
            Statistic::MaxClosingPrice => "max",
            Statistic::MinClosingPrice => "min",
            Statistic::DividendYield => "yield",
        }
    }

    fn calculator(&self) -> Calculator {
        match self {
            Statistic::AverageClosePrice => average_close_price,
            Statistic::TotalDividends => total_dividends,
            Statistic::MaxClosingPrice => max_closing_price,
            Statistic::MinClosingPrice => min_closing_price,
            Statistic::DividendYield => dividend_yield,
        }
    }

    pub fn calculate(&self, instrument: &Instrument) -> Decimal {
        (self.calculator())(instrument)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Statistic {
    type Err = FinvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.short_name() == needle)
            .ok_or_else(|| FinvError::InvalidInput(format!("unknown statistic: {}", s)))
    }
}

/// Compute one statistic.
pub fn calculate(instrument: &Instrument, statistic: Statistic) -> Decimal {
    statistic.calculate(instrument)
}

/// Compute several statistics, in the order given.
pub fn calculate_all(instrument: &Instrument, statistics: &[Statistic]) -> Vec<Decimal> {
    statistics.iter().map(|s| s.calculate(instrument)).collect()
}

fn closes(instrument: &Instrument) -> impl Iterator<Item = Decimal> + '_ {
    instrument.history().iter().map(|h| h.close)
}

fn average_close_price(instrument: &Instrument) -> Decimal {
    let count = instrument.history().len();
    if count == 0 {
        return Decimal::ZERO;
    }
    let total: Decimal = closes(instrument).sum();
    total
        .checked_div(Decimal::from(count))
        .unwrap_or_default()
}

fn max_closing_price(instrument: &Instrument) -> Decimal {
    closes(instrument).max().unwrap_or_default()
}

fn min_closing_price(instrument: &Instrument) -> Decimal {
    closes(instrument).min().unwrap_or_default()
}

fn total_dividends(instrument: &Instrument) -> Decimal {
    instrument.dividends().iter().map(|d| d.amount).sum()
}

/// `(sum(dividends) * (365 / previous close)) / price * 100`.
fn dividend_yield(instrument: &Instrument) -> Decimal {
    let Some(quote) = &instrument.quote else {
        return Decimal::ZERO;
    };
    if quote.price.is_zero() || quote.previous_close.is_zero() || instrument.dividends().is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from(365)
        .checked_div(quote.previous_close)
        .and_then(|factor| total_dividends(instrument).checked_mul(factor))
        .and_then(|annualized| annualized.checked_div(quote.price))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dividend, HistoricalQuote, Quote};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn with_closes(closes: &[Decimal]) -> Instrument {
        let mut instrument = Instrument::new("TEST").unwrap();
        instrument.history = Some(
            closes
                .iter()
                .enumerate()
                .map(|(i, close)| HistoricalQuote {
                    date: day(i as u32 + 1),
                    open: *close,
                    close: *close,
                    adj_close: *close,
                    low: *close,
                    high: *close,
                    volume: 100,
                })
                .collect(),
        );
        instrument
    }

    fn with_yield_inputs(price: Decimal, previous_close: Decimal, dividends: &[Decimal]) -> Instrument {
        let mut instrument = Instrument::new("TEST").unwrap();
        instrument.quote = Some(Quote {
            price,
            previous_close,
            ..Quote::default()
        });
        instrument.dividends = Some(
            dividends
                .iter()
                .enumerate()
                .map(|(i, amount)| Dividend {
                    amount: *amount,
                    date: day(i as u32 + 1),
                })
                .collect(),
        );
        instrument
    }

    #[test]
    fn test_close_price_statistics() {
        let instrument = with_closes(&[dec!(10), dec!(12.5), dec!(9)]);
        assert_eq!(calculate(&instrument, Statistic::AverageClosePrice), dec!(10.5));
        assert_eq!(calculate(&instrument, Statistic::MaxClosingPrice), dec!(12.5));
        assert_eq!(calculate(&instrument, Statistic::MinClosingPrice), dec!(9));

        let uneven = with_closes(&[dec!(10), dec!(12.5), dec!(8)]);
        assert_eq!(
            calculate(&uneven, Statistic::AverageClosePrice),
            dec!(30.5) / dec!(3)
        );
    }

    #[test]
    fn test_empty_history_is_zero() {
        let empty = with_closes(&[]);
        let unfetched = Instrument::new("TEST").unwrap();
        for instrument in [&empty, &unfetched] {
            assert_eq!(calculate(instrument, Statistic::AverageClosePrice), Decimal::ZERO);
            assert_eq!(calculate(instrument, Statistic::MaxClosingPrice), Decimal::ZERO);
            assert_eq!(calculate(instrument, Statistic::MinClosingPrice), Decimal::ZERO);
            assert_eq!(calculate(instrument, Statistic::TotalDividends), Decimal::ZERO);
        }
    }

    #[test]
    fn test_total_dividends() {
        let instrument = with_yield_inputs(dec!(1), dec!(1), &[dec!(0.24), dec!(0.25)]);
        assert_eq!(calculate(&instrument, Statistic::TotalDividends), dec!(0.49));
    }

    #[test]
    fn test_dividend_yield() {
        let instrument = with_yield_inputs(dec!(150), dec!(100), &[dec!(1)]);
        let value = calculate(&instrument, Statistic::DividendYield);
        assert_eq!(value.round_dp(3), dec!(2.433));
    }

    #[test]
    fn test_dividend_yield_zero_cases() {
        let no_quote = Instrument::new("TEST").unwrap();
        assert_eq!(calculate(&no_quote, Statistic::DividendYield), Decimal::ZERO);

        let zero_price = with_yield_inputs(dec!(0), dec!(100), &[dec!(1)]);
        assert_eq!(calculate(&zero_price, Statistic::DividendYield), Decimal::ZERO);

        let no_dividends = with_yield_inputs(dec!(150), dec!(100), &[]);
        assert_eq!(calculate(&no_dividends, Statistic::DividendYield), Decimal::ZERO);

        let zero_previous_close = with_yield_inputs(dec!(150), dec!(0), &[dec!(1)]);
        assert_eq!(calculate(&zero_previous_close, Statistic::DividendYield), Decimal::ZERO);
    }

    #[test]
    fn test_calculate_all_keeps_order() {
        let mut instrument = with_closes(&[dec!(10), dec!(20)]);
        instrument.dividends = Some(vec![Dividend {
            amount: dec!(0.5),
            date: day(1),
        }]);

        let values = calculate_all(
            &instrument,
            &[Statistic::AverageClosePrice, Statistic::TotalDividends],
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], calculate(&instrument, Statistic::AverageClosePrice));
        assert_eq!(values[1], calculate(&instrument, Statistic::TotalDividends));
        assert_eq!(values, vec![dec!(15), dec!(0.5)]);
    }

    #[test]
    fn test_parse_short_names() {
        assert_eq!("avg".parse::<Statistic>().unwrap(), Statistic::AverageClosePrice);
        assert_eq!(" Total-Div ".parse::<Statistic>().unwrap(), Statistic::TotalDividends);
        assert_eq!("yield".parse::<Statistic>().unwrap(), Statistic::DividendYield);
        assert!("median".parse::<Statistic>().is_err());
    }
}
