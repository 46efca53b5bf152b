//! Exposure series construction.

use cne5_math::winsorize;
use cne5_primitives::{
    BenchmarkObservation, ExposureSeries, Industry, PriceObservation, STYLE_COUNT, SecurityCode,
};
use ndarray::{Array1, Array2};

use crate::{
    BetaConfig, LiquidityConfig, MomentumConfig, StyleError, VolatilityConfig, beta, book_to_price,
    earnings_yield, growth, leverage, liquidity, momentum, non_linear_size, size, volatility,
};

/// Configuration for exposure construction.
#[derive(Debug, Clone, Default)]
pub struct ExposureConfig {
    /// Beta factor configuration.
    pub beta: BetaConfig,
    /// Momentum factor configuration.
    pub momentum: MomentumConfig,
    /// Volatility factor configuration.
    pub volatility: VolatilityConfig,
    /// Liquidity factor configuration.
    pub liquidity: LiquidityConfig,
    /// Winsorization quantiles applied per style column.
    pub winsor_quantiles: WinsorQuantiles,
}

/// Winsorization quantile pair.
#[derive(Debug, Clone, Copy)]
pub struct WinsorQuantiles {
    /// Lower tail quantile.
    pub lower: f64,
    /// Upper tail quantile.
    pub upper: f64,
}

impl Default for WinsorQuantiles {
    fn default() -> Self {
        Self { lower: 0.01, upper: 0.99 }
    }
}

impl ExposureConfig {
    /// The longest rolling window across all style factors. Securities
    /// with fewer observations are excluded entirely, and emitted rows
    /// start at the first complete window.
    #[must_use]
    pub fn longest_window(&self) -> usize {
        self.beta
            .window
            .max(self.momentum.long)
            .max(self.volatility.window)
            .max(self.liquidity.windows[2])
    }
}

/// Builds per-security exposure series: ten winsorized style columns plus
/// the one-hot industry classification.
#[derive(Debug, Clone, Default)]
pub struct ExposureBuilder {
    config: ExposureConfig,
}

impl ExposureBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    #[must_use]
    pub const fn with_config(config: ExposureConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExposureConfig {
        &self.config
    }

    /// Build the exposure series for one security.
    ///
    /// `history` must be sorted ascending by date with derived returns.
    /// Returns `Ok(None)` when the security has fewer observations than
    /// the longest rolling window.
    ///
    /// # Errors
    /// Returns `StyleError` on invalid winsorization quantiles.
    pub fn build(
        &self,
        code: SecurityCode,
        industry: Industry,
        history: &[PriceObservation],
        benchmark: &[BenchmarkObservation],
    ) -> Result<Option<ExposureSeries>, StyleError> {
        let window = self.config.longest_window();
        if history.len() < window || window == 0 {
            return Ok(None);
        }

        let size_col = size(history);
        let columns: [Array1<f64>; STYLE_COUNT] = [
            size_col.clone(),
            beta(history, benchmark, &self.config.beta),
            momentum(history, &self.config.momentum),
            volatility(history, &self.config.volatility),
            non_linear_size(&size_col),
            book_to_price(history),
            liquidity(history, &self.config.liquidity),
            earnings_yield(history),
            growth(history),
            leverage(history),
        ];

        let start = window - 1;
        let rows = history.len() - start;
        let quantiles = self.config.winsor_quantiles;

        let mut styles = Array2::from_elem((rows, STYLE_COUNT), f64::NAN);
        for (j, column) in columns.iter().enumerate() {
            let emitted = Array1::from_iter(column.iter().skip(start).copied());
            let clipped = winsorize(&emitted, quantiles.lower, quantiles.upper)?;
            for (i, value) in clipped.iter().enumerate() {
                styles[[i, j]] = *value;
            }
        }

        let dates = history[start..].iter().map(|obs| obs.date).collect();
        Ok(Some(ExposureSeries { code, industry, dates, styles }))
    }
}
