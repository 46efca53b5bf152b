//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid quantile pair.
    #[error("invalid quantiles: ({lower}, {upper}) (must satisfy 0 <= lower < upper <= 1)")]
    InvalidQuantiles {
        /// Lower quantile.
        lower: f64,
        /// Upper quantile.
        upper: f64,
    },

    /// Invalid half-life.
    #[error("invalid half-life: {0} (must be positive)")]
    InvalidHalfLife(usize),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Singular or nearly singular matrix.
    #[error("matrix is singular or nearly singular")]
    Singular,

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::InvalidQuantiles { lower: 0.9, upper: 0.1 };
        assert!(err.to_string().contains("0.9"));

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains("5"));
    }
}
