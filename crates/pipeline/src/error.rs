//! Error types for pipeline orchestration.

use cne5_model::ModelError;
use cne5_store::StoreError;
use cne5_styles::StyleError;

/// Fatal pipeline failures. Everything non-fatal degrades into the run
/// report's issue list instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Storage failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Model estimation failure.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Exposure construction failure.
    #[error("style error: {0}")]
    Style(#[from] StyleError),

    /// Incremental append requested with no prior build present.
    #[error("no existing per-date artifacts; run a full build first")]
    NoExistingArtifacts,

    /// Worker pool could not be constructed.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
