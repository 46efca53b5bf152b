//! Factor-return and residual containers.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::{FACTOR_COUNT, SecurityCode, TradeDate};

/// Daily factor-return rows over the 40-factor axis.
#[derive(Debug, Clone, Default)]
pub struct FactorReturnSeries {
    dates: Vec<TradeDate>,
    rows: Vec<Array1<f64>>,
}

impl FactorReturnSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { dates: Vec::new(), rows: Vec::new() }
    }

    /// Append one day's factor-return row.
    ///
    /// # Panics
    /// Panics if the row is not [`FACTOR_COUNT`] wide.
    pub fn push(&mut self, date: TradeDate, row: Array1<f64>) {
        assert_eq!(row.len(), FACTOR_COUNT, "factor-return row must span the factor axis");
        self.dates.push(date);
        self.rows.push(row);
    }

    /// Number of days in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Session dates in storage order.
    #[must_use]
    pub fn dates(&self) -> &[TradeDate] {
        &self.dates
    }

    /// Factor-return rows in storage order.
    #[must_use]
    pub fn rows(&self) -> &[Array1<f64>] {
        &self.rows
    }

    /// The latest session date, if any.
    #[must_use]
    pub fn latest_date(&self) -> Option<TradeDate> {
        self.dates.iter().max().copied()
    }

    /// Sort rows ascending by date. Regressions complete out of order;
    /// the stored series is always date-sorted.
    pub fn sort_by_date(&mut self) {
        let mut order: Vec<usize> = (0..self.dates.len()).collect();
        order.sort_by_key(|&i| self.dates[i]);

        self.dates = order.iter().map(|&i| self.dates[i]).collect();
        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
    }

    /// Materialize the series as a T x [`FACTOR_COUNT`] matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.rows.len(), FACTOR_COUNT));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                matrix[[i, j]] = *value;
            }
        }
        matrix
    }
}

/// The (date, security, residual) panel produced by the cross-sectional
/// regressions.
#[derive(Debug, Clone, Default)]
pub struct ResidualPanel {
    rows: Vec<(TradeDate, SecurityCode, f64)>,
}

impl ResidualPanel {
    /// Create an empty panel.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append one residual observation.
    pub fn push(&mut self, date: TradeDate, code: SecurityCode, residual: f64) {
        self.rows.push((date, code, residual));
    }

    /// Append one day's residuals.
    pub fn extend_day(&mut self, date: TradeDate, residuals: &[(SecurityCode, f64)]) {
        for (code, residual) in residuals {
            self.rows.push((date, code.clone(), *residual));
        }
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the panel is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All observations in storage order.
    #[must_use]
    pub fn rows(&self) -> &[(TradeDate, SecurityCode, f64)] {
        &self.rows
    }

    /// Sort observations by date, then security code.
    pub fn sort(&mut self) {
        self.rows.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    }

    /// Group residuals by security, each series ascending by date.
    #[must_use]
    pub fn by_security(&self) -> BTreeMap<SecurityCode, Vec<f64>> {
        let mut sorted = self.clone();
        sorted.sort();

        let mut grouped: BTreeMap<SecurityCode, Vec<f64>> = BTreeMap::new();
        for (_, code, residual) in &sorted.rows {
            grouped.entry(code.clone()).or_default().push(*residual);
        }
        grouped
    }
}
