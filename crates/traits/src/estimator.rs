//! Factor return estimation trait definitions.

use ndarray::{Array1, Array2};

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient cross-sectional coverage for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Trait for estimating factor returns from one day's cross section.
pub trait FactorEstimator: Send + Sync {
    /// Configuration type for this estimator.
    type Config: Default + Clone + Send + Sync;

    /// Create a new estimator with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Estimate factor returns for a single trading day.
    ///
    /// # Arguments
    /// * `exposures` - Exposure matrix (n_securities x n_factors)
    /// * `returns` - Same-day security returns (n_securities,)
    /// * `market_values` - Total market values used for weighting (n_securities,)
    ///
    /// # Returns
    /// Tuple of (factor_returns, residuals). Residuals are dense over the
    /// rows that passed the validity filter; their row indices into the
    /// input are returned alongside.
    ///
    /// # Errors
    /// Returns `EstimatorError` if dimensions mismatch.
    fn estimate_day(
        &self,
        exposures: &Array2<f64>,
        returns: &Array1<f64>,
        market_values: &Array1<f64>,
    ) -> Result<(Array1<f64>, Vec<(usize, f64)>), EstimatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_error_is_recoverable() {
        let err = EstimatorError::InsufficientData { required: 50, actual: 5 };
        assert!(err.is_recoverable());

        let err = EstimatorError::LinearAlgebra("singular".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn estimator_error_display() {
        let err = EstimatorError::DimensionMismatch {
            expected: 100,
            actual: 50,
            context: "returns".to_string(),
        };
        assert_eq!(err.to_string(), "dimension mismatch for returns: expected 100, got 50");
    }
}
