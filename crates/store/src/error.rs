//! Error types for the storage edge.

/// Errors that can occur while reading panels or publishing artifacts.
///
/// Only I/O-level failures escalate; data-quality problems degrade into
/// warnings and skip counters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Columnar read or write error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Risk-parameters document error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing required column in an artifact.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Artifact exists but cannot be interpreted.
    #[error("invalid artifact {path}: {reason}")]
    InvalidArtifact {
        /// Offending path.
        path: String,
        /// What was wrong with it.
        reason: String,
    },
}
