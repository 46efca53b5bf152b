//! Beta factor: rolling regression against the benchmark index.

use std::collections::BTreeMap;

use cne5_math::rolling_beta;
use cne5_primitives::{BenchmarkObservation, PriceObservation, TradeDate};
use ndarray::Array1;

/// Configuration for the beta factor.
#[derive(Debug, Clone)]
pub struct BetaConfig {
    /// Rolling window in sessions.
    pub window: usize,
    /// Minimum fraction of the window with valid stock/benchmark pairs.
    pub min_valid_fraction: f64,
}

impl Default for BetaConfig {
    fn default() -> Self {
        Self { window: 252, min_valid_fraction: 0.8 }
    }
}

/// Beta exposure per session.
///
/// The security's log returns are inner-joined with the benchmark's by
/// date before the rolling covariance-over-variance estimate; sessions
/// the benchmark did not trade contribute missing pairs. With no
/// benchmark data at all, every session gets the constant 1.0.
#[must_use]
pub fn beta(
    history: &[PriceObservation],
    benchmark: &[BenchmarkObservation],
    config: &BetaConfig,
) -> Array1<f64> {
    if benchmark.is_empty() {
        return Array1::from_elem(history.len(), 1.0);
    }

    let bench_by_date: BTreeMap<TradeDate, f64> =
        benchmark.iter().map(|obs| (obs.date, obs.log_return)).collect();

    let stock_returns: Vec<f64> = history.iter().map(|obs| obs.log_return).collect();
    let bench_returns: Vec<f64> = history
        .iter()
        .map(|obs| bench_by_date.get(&obs.date).copied().unwrap_or(f64::NAN))
        .collect();

    rolling_beta(&stock_returns, &bench_returns, config.window, config.min_valid_fraction)
}
