//! Per-day weighted cross-sectional regression.

use cne5_math::wls_ridge;
use cne5_primitives::{CrossSection, SecurityCode, TradeDate};
use cne5_traits::{EstimatorError, FactorEstimator};
use ndarray::{Array1, Array2};
use tracing::warn;

/// Configuration for the cross-sectional regressor.
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Minimum valid securities required to regress a day.
    pub min_stocks: usize,
    /// Ridge coefficient applied on a rank-deficient design matrix.
    pub ridge_lambda: f64,
    /// Floor applied to total market value before the square-root weight.
    pub market_value_floor: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self { min_stocks: 50, ridge_lambda: 0.01, market_value_floor: 1e8 }
    }
}

/// One day's regression output.
#[derive(Debug, Clone)]
pub struct DayRegression {
    /// Trading session date.
    pub date: TradeDate,
    /// Factor returns over the full factor axis; zeros for skipped
    /// columns and for insufficient or degenerate days.
    pub factor_returns: Array1<f64>,
    /// Per-security residuals, dense over the rows that passed the
    /// validity filter. Empty for insufficient or degenerate days.
    pub residuals: Vec<(SecurityCode, f64)>,
    /// Whether the day fell below the minimum-coverage threshold.
    pub insufficient: bool,
}

/// Weighted least squares regressor for one day's cross section.
///
/// Solves `f = (X'WX)^-1 X'Wy` with `W_ii = sqrt(max(mv_i, floor))`.
/// Columns with no finite value in the cross section (growth and leverage
/// on price-only panels) are dropped from the design matrix and reported
/// as zero.
#[derive(Debug, Clone, Default)]
pub struct CrossSectionRegressor {
    config: RegressionConfig,
}

impl CrossSectionRegressor {
    /// Create a regressor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Regress one day's cross section against same-day returns.
    ///
    /// # Errors
    /// Returns `ModelError` on dimension mismatches.
    pub fn regress(
        &self,
        cross_section: &CrossSection,
        returns: &Array1<f64>,
        market_values: &Array1<f64>,
    ) -> Result<DayRegression, crate::ModelError> {
        let (factor_returns, indexed) =
            self.estimate_day(&cross_section.exposures, returns, market_values)?;

        let residuals: Vec<(SecurityCode, f64)> = indexed
            .into_iter()
            .map(|(row, residual)| (cross_section.codes[row].clone(), residual))
            .collect();
        let insufficient = residuals.is_empty();

        Ok(DayRegression { date: cross_section.date, factor_returns, residuals, insufficient })
    }
}

impl FactorEstimator for CrossSectionRegressor {
    type Config = RegressionConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn estimate_day(
        &self,
        exposures: &Array2<f64>,
        returns: &Array1<f64>,
        market_values: &Array1<f64>,
    ) -> Result<(Array1<f64>, Vec<(usize, f64)>), EstimatorError> {
        let n = returns.len();
        let p = exposures.ncols();

        if exposures.nrows() != n {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: exposures.nrows(),
                context: "exposures".to_string(),
            });
        }
        if market_values.len() != n {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: market_values.len(),
                context: "market_values".to_string(),
            });
        }

        // Columns with no finite value anywhere are skipped; their factor
        // return is reported as zero.
        let active: Vec<usize> =
            (0..p).filter(|&j| exposures.column(j).iter().any(|x| x.is_finite())).collect();

        // Rows must have a finite return and finite values in every
        // active column.
        let valid: Vec<usize> = (0..n)
            .filter(|&i| {
                returns[i].is_finite() && active.iter().all(|&j| exposures[[i, j]].is_finite())
            })
            .collect();

        if valid.len() < self.config.min_stocks || active.is_empty() {
            return Ok((Array1::zeros(p), Vec::new()));
        }

        let mut x = Array2::zeros((valid.len(), active.len()));
        let mut y = Array1::zeros(valid.len());
        let mut weights = Array1::zeros(valid.len());
        for (row, &i) in valid.iter().enumerate() {
            for (col, &j) in active.iter().enumerate() {
                x[[row, col]] = exposures[[i, j]];
            }
            y[row] = returns[i];
            let mv = market_values[i];
            let floored =
                if mv.is_finite() { mv.max(self.config.market_value_floor) } else { self.config.market_value_floor };
            weights[row] = floored.sqrt();
        }

        match wls_ridge(&x, &y, &weights, self.config.ridge_lambda) {
            Ok(solution) => {
                let mut factor_returns = Array1::zeros(p);
                for (col, &j) in active.iter().enumerate() {
                    factor_returns[j] = solution.coefficients[col];
                }
                let residuals =
                    valid.iter().copied().zip(solution.residuals.iter().copied()).collect();
                Ok((factor_returns, residuals))
            }
            Err(err) => {
                warn!(error = %err, "cross-sectional solve failed, emitting zero factor returns");
                Ok((Array1::zeros(p), Vec::new()))
            }
        }
    }
}
