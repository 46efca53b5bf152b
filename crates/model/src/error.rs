//! Error types for factor model estimation.

use cne5_math::MathError;
use cne5_traits::EstimatorError;

/// Errors that can occur during factor model estimation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// No complete factor-return rows to estimate from.
    #[error("no complete factor-return rows available")]
    NoFactorReturns,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoFactorReturns | Self::Estimator(EstimatorError::InsufficientData { .. })
        )
    }
}
