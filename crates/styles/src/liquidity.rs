//! Liquidity factor: weighted average turnover.

use cne5_math::rolling_mean;
use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Configuration for the liquidity factor.
#[derive(Debug, Clone)]
pub struct LiquidityConfig {
    /// Rolling windows in sessions: one, three and twelve months.
    pub windows: [usize; 3],
    /// Minimum non-missing turnover observations per window.
    pub min_valid: [usize; 3],
    /// Blend weights for the three windows.
    pub weights: [f64; 3],
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self { windows: [21, 63, 252], min_valid: [10, 42, 126], weights: [0.35, 0.35, 0.30] }
    }
}

/// Liquidity exposure per session: the weighted blend of mean turnover
/// over the one-, three- and twelve-month windows. Missing whenever any
/// of the three component means is missing.
#[must_use]
pub fn liquidity(history: &[PriceObservation], config: &LiquidityConfig) -> Array1<f64> {
    let turnover: Vec<f64> = history.iter().map(|obs| obs.turnover_rate).collect();

    let short = rolling_mean(&turnover, config.windows[0], config.min_valid[0]);
    let medium = rolling_mean(&turnover, config.windows[1], config.min_valid[1]);
    let long = rolling_mean(&turnover, config.windows[2], config.min_valid[2]);

    Array1::from_iter((0..turnover.len()).map(|i| {
        config.weights[0] * short[i] + config.weights[1] * medium[i] + config.weights[2] * long[i]
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cne5_primitives::TradeDate;

    use super::*;

    fn history(turnovers: &[f64]) -> Vec<PriceObservation> {
        turnovers
            .iter()
            .enumerate()
            .map(|(i, &turnover)| {
                let date = TradeDate::from_ymd_opt(2023, 1, 2).unwrap()
                    + chrono::Duration::days(i as i64);
                let mut obs = PriceObservation::empty(date);
                obs.turnover_rate = turnover;
                obs
            })
            .collect()
    }

    #[test]
    fn constant_turnover_blends_to_itself() {
        let history = history(&[2.0; 300]);
        let out = liquidity(&history, &LiquidityConfig::default());

        // The weights sum to 1, so constant turnover passes through.
        assert!(out[250].is_nan());
        assert_relative_eq!(out[251], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[299], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_long_window_makes_the_blend_missing() {
        // Shorter than the long window: no session ever emits.
        let history = history(&[1.5; 100]);
        let out = liquidity(&history, &LiquidityConfig::default());
        assert!(out.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn blend_uses_the_configured_weights() {
        let config = LiquidityConfig { windows: [2, 3, 4], min_valid: [2, 3, 4], weights: [0.5, 0.3, 0.2] };
        let history = history(&[1.0, 2.0, 3.0, 4.0]);
        let out = liquidity(&history, &config);

        // i = 3: means are 3.5, 3.0 and 2.5.
        assert_relative_eq!(out[3], 0.5 * 3.5 + 0.3 * 3.0 + 0.2 * 2.5, epsilon = 1e-12);
        assert!(out[2].is_nan());
    }
}
