//! Exchange trading calendar.

use std::path::Path;

use cne5_primitives::TradeDate;
use tracing::warn;

use crate::frame::{date_column, i64_column, read_parquet};

/// The A-share trading calendar: open session dates, ascending.
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    days: Vec<TradeDate>,
}

impl TradingCalendar {
    /// Build a calendar from an explicit list of open days.
    #[must_use]
    pub fn from_days(mut days: Vec<TradeDate>) -> Self {
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Load the calendar from a `trade_cal` table with `cal_date` and
    /// `is_open` columns. A missing or unreadable file yields an empty
    /// calendar with a warning, never an error.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let df = match read_parquet(path) {
            Ok(df) => df,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "trading calendar unavailable");
                return Self::default();
            }
        };

        let (dates, open_flags) = match (date_column(&df, "cal_date"), i64_column(&df, "is_open"))
        {
            (Ok(dates), Ok(open_flags)) => (dates, open_flags),
            _ => {
                warn!(path = %path.display(), "trading calendar has unexpected schema");
                return Self::default();
            }
        };

        let days = dates
            .into_iter()
            .zip(open_flags)
            .filter_map(|(date, open)| match date {
                Some(date) if open == 1 => Some(date),
                _ => None,
            })
            .collect();
        Self::from_days(days)
    }

    /// Number of open days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the calendar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// All open days, ascending.
    #[must_use]
    pub fn days(&self) -> &[TradeDate] {
        &self.days
    }

    /// Open days strictly after `after`; the whole calendar for `None`.
    #[must_use]
    pub fn days_after(&self, after: Option<TradeDate>) -> Vec<TradeDate> {
        match after {
            None => self.days.clone(),
            Some(cursor) => {
                let start = self.days.partition_point(|d| *d <= cursor);
                self.days[start..].to_vec()
            }
        }
    }

    /// Whether `date` is an open session.
    #[must_use]
    pub fn contains(&self, date: TradeDate) -> bool {
        self.days.binary_search(&date).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> TradeDate {
        TradeDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn from_days_sorts_and_dedups() {
        let calendar = TradingCalendar::from_days(vec![day(28), day(27), day(28), day(25)]);
        assert_eq!(calendar.days(), &[day(25), day(27), day(28)]);
        assert!(calendar.contains(day(27)));
        assert!(!calendar.contains(day(26)));
    }

    #[test]
    fn days_after_is_strict() {
        let calendar = TradingCalendar::from_days(vec![day(25), day(26), day(27), day(28)]);
        assert_eq!(calendar.days_after(Some(day(26))), vec![day(27), day(28)]);
        assert_eq!(calendar.days_after(None).len(), 4);
        assert!(calendar.days_after(Some(day(28))).is_empty());
    }

    #[test]
    fn missing_file_is_an_empty_calendar() {
        let calendar = TradingCalendar::load(Path::new("/nonexistent/trade_cal.parquet"));
        assert!(calendar.is_empty());
    }
}
