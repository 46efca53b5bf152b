//! Exposure containers: per-security series and per-date cross sections.

use ndarray::{Array1, Array2};

use crate::{FACTOR_COUNT, Industry, STYLE_COUNT, SecurityCode, TradeDate};

/// Time series of style exposures for one security.
///
/// `styles` has one row per date and [`STYLE_COUNT`] columns in
/// [`crate::StyleFactor::ALL`] order; missing values are `NaN`. The
/// industry classification is constant over the series; its one-hot
/// encoding is materialized on demand by [`ExposureSeries::dense_row`].
#[derive(Debug, Clone)]
pub struct ExposureSeries {
    /// Security this series belongs to.
    pub code: SecurityCode,
    /// Canonical industry classification.
    pub industry: Industry,
    /// Session dates, ascending.
    pub dates: Vec<TradeDate>,
    /// Style exposures, one row per date.
    pub styles: Array2<f64>,
}

impl ExposureSeries {
    /// Number of dated rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Full 40-wide exposure row at position `i`: styles followed by the
    /// one-hot industry dummies. The industry columns sum to exactly 1.
    #[must_use]
    pub fn dense_row(&self, i: usize) -> Array1<f64> {
        let mut row = Array1::zeros(FACTOR_COUNT);
        for (j, value) in self.styles.row(i).iter().enumerate() {
            row[j] = *value;
        }
        row[STYLE_COUNT + self.industry.index()] = 1.0;
        row
    }

    /// Position of `date` in the series, if present.
    #[must_use]
    pub fn position(&self, date: TradeDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

/// One trading day's cross-sectional exposure table.
///
/// `exposures` has one row per security and [`FACTOR_COUNT`] columns in
/// [`crate::Factor::ALL`] order.
#[derive(Debug, Clone)]
pub struct CrossSection {
    /// Trading session date.
    pub date: TradeDate,
    /// Securities, in row order.
    pub codes: Vec<SecurityCode>,
    /// Exposure matrix, one row per security.
    pub exposures: Array2<f64>,
}

impl CrossSection {
    /// Number of securities in the cross section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the cross section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn dense_row_sets_exactly_one_industry() {
        let series = ExposureSeries {
            code: SecurityCode::parse("000001.SZ").unwrap(),
            industry: Industry::Banking,
            dates: vec![TradeDate::from_ymd_opt(2024, 1, 2).unwrap()],
            styles: Array2::from_elem((1, STYLE_COUNT), 0.5),
        };

        let row = series.dense_row(0);
        assert_eq!(row.len(), FACTOR_COUNT);

        let industry_sum: f64 = row.iter().skip(STYLE_COUNT).sum();
        assert_eq!(industry_sum, 1.0);
        assert_eq!(row[STYLE_COUNT + Industry::Banking.index()], 1.0);
    }

    #[test]
    fn position_finds_dates() {
        let dates: Vec<TradeDate> =
            (2..6).map(|d| TradeDate::from_ymd_opt(2024, 1, d).unwrap()).collect();
        let series = ExposureSeries {
            code: SecurityCode::parse("000001.SZ").unwrap(),
            industry: Industry::Comprehensive,
            dates: dates.clone(),
            styles: Array2::zeros((4, STYLE_COUNT)),
        };

        assert_eq!(series.position(dates[2]), Some(2));
        assert_eq!(series.position(TradeDate::from_ymd_opt(2024, 2, 1).unwrap()), None);
    }
}
