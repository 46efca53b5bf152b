//! Pipeline configuration.

use cne5_model::{RegressionConfig, RiskConfig};
use cne5_styles::ExposureConfig;

/// Configuration for the full pipeline.
///
/// The component configurations carry the model constants (windows,
/// half-lives, winsorization quantiles, regression thresholds); the
/// fields here govern execution.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Degree of parallelism for exposure builds and day regressions.
    pub parallelism: usize,
    /// Trading days per transposer pass; bounds transposer memory at
    /// O(securities x factors x chunk).
    pub transpose_chunk: usize,
    /// Missing per-date files tolerated at calendar edges before the
    /// completeness check raises an issue.
    pub completeness_tolerance: usize,
    /// Exposure construction configuration.
    pub exposure: ExposureConfig,
    /// Cross-sectional regression configuration.
    pub regression: RegressionConfig,
    /// Risk estimation configuration.
    pub risk: RiskConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            transpose_chunk: 32,
            completeness_tolerance: 2,
            exposure: ExposureConfig::default(),
            regression: RegressionConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}
