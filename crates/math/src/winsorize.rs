//! Winsorization against interpolated tail quantiles.

use ndarray::Array1;

use crate::{MathError, quantile};

/// Winsorize a sequence to the given quantile pair.
///
/// Non-finite values are first replaced with `NaN` (missing), then every
/// remaining value is clamped to the linearly interpolated `lower_q` and
/// `upper_q` quantiles of the non-missing values.
///
/// # Arguments
/// * `data` - Input array; `NaN` marks missing
/// * `lower_q` - Lower tail quantile (e.g. 0.01)
/// * `upper_q` - Upper tail quantile (e.g. 0.99)
///
/// # Errors
/// Returns `MathError::InvalidQuantiles` unless `0 <= lower_q < upper_q <= 1`.
pub fn winsorize(data: &Array1<f64>, lower_q: f64, upper_q: f64) -> Result<Array1<f64>, MathError> {
    if !(0.0..=1.0).contains(&lower_q) || !(0.0..=1.0).contains(&upper_q) || lower_q >= upper_q {
        return Err(MathError::InvalidQuantiles { lower: lower_q, upper: upper_q });
    }

    let cleaned = data.mapv(|x| if x.is_finite() { x } else { f64::NAN });

    let values: Vec<f64> = cleaned.iter().copied().collect();
    let (Some(lower), Some(upper)) = (quantile(&values, lower_q), quantile(&values, upper_q))
    else {
        return Ok(cleaned);
    };

    Ok(cleaned.mapv(|x| if x.is_nan() { x } else { x.clamp(lower, upper) }))
}
