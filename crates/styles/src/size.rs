//! Size and non-linear size factors.

use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Size exposure: natural log of total market value.
///
/// Zero, negative or missing market values are missing.
#[must_use]
pub fn size(history: &[PriceObservation]) -> Array1<f64> {
    Array1::from_iter(history.iter().map(|obs| {
        let mv = obs.total_market_value;
        if mv.is_finite() && mv > 0.0 { mv.ln() } else { f64::NAN }
    }))
}

/// Non-linear size exposure: the cube of the size exposure.
///
/// The cube is taken of the raw size column, not an orthogonalized
/// residual; Barra CNE5 proper orthogonalizes against size.
#[must_use]
pub fn non_linear_size(size: &Array1<f64>) -> Array1<f64> {
    size.mapv(|s| s.powi(3))
}
