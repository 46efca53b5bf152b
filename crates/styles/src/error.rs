//! Error types for exposure construction.

use cne5_math::MathError;

/// Errors that can occur while building style exposures.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Math kernel error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StyleError::InvalidConfig("liquidity weights must sum to 1".to_string());
        assert!(err.to_string().contains("liquidity weights"));
    }
}
