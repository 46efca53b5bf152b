//! Risk-model estimation: factor covariance and specific risk.

use std::collections::BTreeMap;

use cne5_math::{ewma_covariance, ewma_std, lift_positive_definite, population_std, sample_std};
use cne5_primitives::{
    FACTOR_COUNT, Factor, FactorReturnSeries, ResidualPanel, RiskParameters, SecurityCode,
    TradeDate,
};
use ndarray::{Array1, Array2};
use tracing::{info, warn};

use crate::ModelError;

const EIGEN_EPSILON: f64 = 1e-6;
const SESSIONS_PER_YEAR: f64 = 252.0;

/// Configuration for risk estimation.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Residual observations required for the exponentially weighted
    /// specific-risk estimate; shorter series fall back to a plain
    /// standard deviation.
    pub estimation_window: usize,
    /// Exponential-decay half-life in sessions.
    pub half_life: usize,
    /// Lower bound on specific risk.
    pub specific_risk_floor: f64,
    /// Upper bound on specific risk.
    pub specific_risk_cap: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            estimation_window: 252,
            half_life: 90,
            specific_risk_floor: 0.01,
            specific_risk_cap: 0.10,
        }
    }
}

/// The estimated risk model.
#[derive(Debug, Clone)]
pub struct RiskModel {
    /// Latest trading day that entered the estimation.
    pub estimation_date: TradeDate,
    /// Symmetric positive-definite factor covariance over the factor axis.
    pub covariance: Array2<f64>,
    /// Annualized per-factor volatility.
    pub volatility: Array1<f64>,
    /// Specific risk per security, clipped to the configured bounds.
    pub specific_risks: BTreeMap<SecurityCode, f64>,
    /// Diagonal adjustment applied by the positive-definite lift, if any.
    pub lift_adjustment: Option<f64>,
}

impl RiskModel {
    /// Assemble the publishable risk-parameters document.
    #[must_use]
    pub fn to_parameters(&self, config: &RiskConfig) -> RiskParameters {
        let mut factor_covariance = BTreeMap::new();
        let mut factor_volatility = BTreeMap::new();
        for (i, row_factor) in Factor::ALL.iter().enumerate() {
            let mut row = BTreeMap::new();
            for (j, col_factor) in Factor::ALL.iter().enumerate() {
                row.insert(col_factor.column_name().to_string(), self.covariance[[i, j]]);
            }
            factor_covariance.insert(row_factor.column_name().to_string(), row);
            factor_volatility.insert(row_factor.column_name().to_string(), self.volatility[i]);
        }

        let specific_risks = self
            .specific_risks
            .iter()
            .map(|(code, risk)| (code.as_str().to_string(), *risk))
            .collect();

        RiskParameters {
            estimation_date: self.estimation_date,
            estimation_window: config.estimation_window,
            half_life: config.half_life,
            num_factors: FACTOR_COUNT,
            num_stocks: self.specific_risks.len(),
            factor_covariance,
            factor_volatility,
            specific_risks,
        }
    }
}

/// Estimates the factor covariance matrix and per-security specific risk
/// from the regression outputs.
#[derive(Debug, Clone, Default)]
pub struct RiskEstimator {
    config: RiskConfig,
}

impl RiskEstimator {
    /// Create an estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom configuration.
    #[must_use]
    pub const fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Estimate the risk model.
    ///
    /// Factor-return rows containing any missing value are dropped before
    /// the covariance estimate; the result is lifted to positive
    /// definiteness when needed.
    ///
    /// # Errors
    /// Returns `ModelError::NoFactorReturns` when no complete row exists.
    pub fn estimate(
        &self,
        series: &FactorReturnSeries,
        residuals: &ResidualPanel,
    ) -> Result<RiskModel, ModelError> {
        let complete: Vec<usize> = (0..series.len())
            .filter(|&i| series.rows()[i].iter().all(|x| x.is_finite()))
            .collect();
        if complete.is_empty() {
            return Err(ModelError::NoFactorReturns);
        }

        let mut matrix = Array2::zeros((complete.len(), FACTOR_COUNT));
        for (row, &i) in complete.iter().enumerate() {
            for (col, value) in series.rows()[i].iter().enumerate() {
                matrix[[row, col]] = *value;
            }
        }

        let raw = ewma_covariance(&matrix, self.config.half_life)?;
        let (covariance, lift_adjustment) = lift_positive_definite(&raw, EIGEN_EPSILON)?;
        if let Some(adjustment) = lift_adjustment {
            warn!(adjustment, "factor covariance was not positive definite, lifted diagonal");
        }

        let volatility = Array1::from_iter((0..FACTOR_COUNT).map(|j| {
            let column: Vec<f64> = matrix.column(j).to_vec();
            SESSIONS_PER_YEAR.sqrt() * sample_std(&column)
        }));

        let specific_risks = self.estimate_specific(residuals)?;

        let estimation_date = complete
            .iter()
            .map(|&i| series.dates()[i])
            .max()
            .unwrap_or_default();

        info!(
            days = complete.len(),
            stocks = specific_risks.len(),
            "risk model estimated"
        );

        Ok(RiskModel { estimation_date, covariance, volatility, specific_risks, lift_adjustment })
    }

    fn estimate_specific(
        &self,
        residuals: &ResidualPanel,
    ) -> Result<BTreeMap<SecurityCode, f64>, ModelError> {
        let mut specific = BTreeMap::new();
        for (code, series) in residuals.by_security() {
            if series.is_empty() {
                continue;
            }

            let raw = if series.len() >= self.config.estimation_window {
                ewma_std(&series, self.config.half_life)?
            } else {
                population_std(&series)
            };
            if !raw.is_finite() {
                continue;
            }

            let clipped =
                raw.clamp(self.config.specific_risk_floor, self.config.specific_risk_cap);
            specific.insert(code, clipped);
        }
        Ok(specific)
    }
}
