//! Market observation records.

use serde::{Deserialize, Serialize};

use crate::TradeDate;

/// One end-of-day record for a single security.
///
/// Any field other than `date` may be missing, encoded as `f64::NAN`.
/// Readers must treat zero and negative values in denominators (market
/// value, price-to-book, trailing P/E) as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Trading session date.
    pub date: TradeDate,
    /// Closing price.
    pub close: f64,
    /// Same-day percent change of the close, as a decimal fraction.
    pub pct_change: f64,
    /// Daily turnover rate.
    pub turnover_rate: f64,
    /// Total market value.
    pub total_market_value: f64,
    /// Price-to-book ratio.
    pub price_to_book: f64,
    /// Trailing twelve-month price-to-earnings ratio.
    pub trailing_pe: f64,
    /// Daily log return, derived from consecutive closes.
    pub log_return: f64,
}

impl PriceObservation {
    /// A record with every numeric field missing.
    #[must_use]
    pub const fn empty(date: TradeDate) -> Self {
        Self {
            date,
            close: f64::NAN,
            pct_change: f64::NAN,
            turnover_rate: f64::NAN,
            total_market_value: f64::NAN,
            price_to_book: f64::NAN,
            trailing_pe: f64::NAN,
            log_return: f64::NAN,
        }
    }
}

/// One end-of-day record for the benchmark index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkObservation {
    /// Trading session date.
    pub date: TradeDate,
    /// Closing level.
    pub close: f64,
    /// Daily log return, derived from consecutive closes.
    pub log_return: f64,
}

/// Derive log returns (and fill missing pct-changes) from consecutive
/// closes, in place.
///
/// The series must be sorted ascending by date. A return is missing when
/// either close is non-positive or non-finite; the first row is always
/// missing.
pub fn derive_returns(observations: &mut [PriceObservation]) {
    let mut prev_close = f64::NAN;
    for obs in observations.iter_mut() {
        let valid = obs.close.is_finite()
            && obs.close > 0.0
            && prev_close.is_finite()
            && prev_close > 0.0;
        if valid {
            obs.log_return = (obs.close / prev_close).ln();
            if !obs.pct_change.is_finite() {
                obs.pct_change = obs.close / prev_close - 1.0;
            }
        } else {
            obs.log_return = f64::NAN;
        }
        prev_close = obs.close;
    }
}
