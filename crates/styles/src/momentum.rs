//! Momentum factor.

use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Configuration for the momentum factor.
#[derive(Debug, Clone)]
pub struct MomentumConfig {
    /// Short lag in sessions, skipped to avoid short-term reversal.
    pub short: usize,
    /// Long look-back window in sessions.
    pub long: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { short: 21, long: 252 }
    }
}

/// Momentum exposure per session: the price 21 sessions back over the
/// price at the start of the inclusive 252-session window, minus one.
///
/// A session is missing until a full `long` window of history exists, so
/// a security with exactly `long` observations emits exactly one value.
/// Non-positive anchor prices are missing.
#[must_use]
pub fn momentum(history: &[PriceObservation], config: &MomentumConfig) -> Array1<f64> {
    let n = history.len();
    let mut out = Array1::from_elem(n, f64::NAN);
    if config.long == 0 || config.short >= config.long {
        return out;
    }

    for i in (config.long - 1)..n {
        let short_anchor = history[i - config.short].close;
        let long_anchor = history[i + 1 - config.long].close;

        let valid = short_anchor.is_finite()
            && short_anchor > 0.0
            && long_anchor.is_finite()
            && long_anchor > 0.0;
        if valid {
            out[i] = short_anchor / long_anchor - 1.0;
        }
    }

    out
}
