//! Volatility factor.

use cne5_math::rolling_std;
use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Configuration for the volatility factor.
#[derive(Debug, Clone)]
pub struct VolatilityConfig {
    /// Rolling window in sessions.
    pub window: usize,
    /// Minimum non-missing returns per window.
    pub min_valid: usize,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self { window: 252, min_valid: 126 }
    }
}

/// Volatility exposure per session: rolling sample standard deviation of
/// daily log returns over a full trailing window.
#[must_use]
pub fn volatility(history: &[PriceObservation], config: &VolatilityConfig) -> Array1<f64> {
    let returns: Vec<f64> = history.iter().map(|obs| obs.log_return).collect();
    rolling_std(&returns, config.window, config.min_valid)
}

#[cfg(test)]
mod tests {
    use cne5_primitives::{TradeDate, derive_returns};

    use super::*;

    fn history(len: usize) -> Vec<PriceObservation> {
        let mut out: Vec<PriceObservation> = (0..len)
            .map(|i| {
                let date = TradeDate::from_ymd_opt(2023, 1, 2).unwrap()
                    + chrono::Duration::days(i as i64);
                let mut obs = PriceObservation::empty(date);
                obs.close = 100.0 + (i % 13) as f64;
                obs
            })
            .collect();
        derive_returns(&mut out);
        out
    }

    #[test]
    fn first_emission_at_the_full_window() {
        let out = volatility(&history(252), &VolatilityConfig::default());
        assert_eq!(out.iter().filter(|x| x.is_finite()).count(), 1);
        assert!(out[251].is_finite());
        assert!(out[251] > 0.0);
    }

    #[test]
    fn min_valid_gate_applies_within_the_window() {
        let mut history = history(40);
        // Wipe out most closes so too few returns survive.
        for obs in history.iter_mut().take(35) {
            obs.close = f64::NAN;
        }
        derive_returns(&mut history);

        let config = VolatilityConfig { window: 40, min_valid: 10 };
        let out = volatility(&history, &config);
        assert!(out[39].is_nan());
    }
}
