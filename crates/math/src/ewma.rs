//! Exponentially weighted statistics.

use ndarray::{Array1, Array2};

use crate::MathError;

/// Generate exponentially decaying weights.
///
/// # Arguments
/// * `window` - Number of trailing periods
/// * `half_life` - Half-life in periods
///
/// # Returns
/// Array of weights, most recent first, normalized to sum to 1.
#[must_use]
pub fn exp_weights(window: usize, half_life: usize) -> Array1<f64> {
    if window == 0 || half_life == 0 {
        return Array1::zeros(window);
    }

    let decay = 0.5_f64.powf(1.0 / half_life as f64);
    let mut weights = Array1::zeros(window);

    for i in 0..window {
        weights[i] = decay.powi(i as i32);
    }

    let total: f64 = weights.sum();
    if total > 0.0 {
        weights /= total;
    }

    weights
}

/// Exponentially weighted covariance of the columns of a T x K matrix.
///
/// Row `t` carries weight `decay^(T-1-t)` with `decay = 0.5^(1/half_life)`,
/// weights normalized to sum to 1. Columns are centered with the weighted
/// mean; the result is the weighted cross-product, a symmetric K x K
/// matrix. Rows containing missing values must be filtered by the caller.
///
/// # Errors
/// Returns `MathError::EmptyData` for a zero-row matrix and
/// `MathError::InvalidHalfLife` for a zero half-life.
pub fn ewma_covariance(matrix: &Array2<f64>, half_life: usize) -> Result<Array2<f64>, MathError> {
    if half_life == 0 {
        return Err(MathError::InvalidHalfLife(half_life));
    }
    let t = matrix.nrows();
    let k = matrix.ncols();
    if t == 0 {
        return Err(MathError::EmptyData);
    }

    // exp_weights is most-recent-first; row t sits T-1-t periods back.
    let recency = exp_weights(t, half_life);
    let weights = Array1::from_iter((0..t).map(|row| recency[t - 1 - row]));

    let mut means = Array1::<f64>::zeros(k);
    for row in 0..t {
        for col in 0..k {
            means[col] += weights[row] * matrix[[row, col]];
        }
    }

    let mut scaled = Array2::zeros((t, k));
    for row in 0..t {
        let sqrt_w = weights[row].sqrt();
        for col in 0..k {
            scaled[[row, col]] = sqrt_w * (matrix[[row, col]] - means[col]);
        }
    }

    Ok(scaled.t().dot(&scaled))
}

/// Exponentially weighted standard deviation of a sequence.
///
/// Non-finite values are discarded; the weights span the remaining
/// observations, most recent last. Returns `NaN` for an empty sequence.
///
/// # Errors
/// Returns `MathError::InvalidHalfLife` for a zero half-life.
pub fn ewma_std(data: &[f64], half_life: usize) -> Result<f64, MathError> {
    if half_life == 0 {
        return Err(MathError::InvalidHalfLife(half_life));
    }

    let valid: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    let t = valid.len();
    if t == 0 {
        return Ok(f64::NAN);
    }

    let recency = exp_weights(t, half_life);
    let weights: Vec<f64> = (0..t).map(|row| recency[t - 1 - row]).collect();

    let mean: f64 = weights.iter().zip(&valid).map(|(w, x)| w * x).sum();
    let variance: f64 = weights.iter().zip(&valid).map(|(w, x)| w * (x - mean).powi(2)).sum();

    Ok(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn exp_weights_sum_to_one() {
        let weights = exp_weights(20, 5);
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn exp_weights_decreasing() {
        let weights = exp_weights(10, 3);
        for i in 1..weights.len() {
            assert!(weights[i] < weights[i - 1]);
        }
    }

    #[rstest]
    #[case(10, 5)]
    #[case(252, 90)]
    #[case(504, 126)]
    fn exp_weights_half_life_property(#[case] window: usize, #[case] half_life: usize) {
        let weights = exp_weights(window, half_life);
        if half_life < window {
            let ratio = weights[half_life] / weights[0];
            assert_relative_eq!(ratio, 0.5, epsilon = 0.01);
        }
    }

    #[test]
    fn exp_weights_zero_window() {
        assert!(exp_weights(0, 5).is_empty());
    }

    #[test]
    fn ewma_covariance_is_symmetric() {
        let matrix = array![
            [0.01, -0.02, 0.005],
            [0.02, 0.01, -0.01],
            [-0.01, 0.03, 0.002],
            [0.005, -0.015, 0.01],
            [0.0, 0.02, -0.005],
        ];
        let cov = ewma_covariance(&matrix, 3).unwrap();

        assert_eq!(cov.shape(), &[3, 3]);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(cov[[i, j]], cov[[j, i]], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn ewma_covariance_constant_column_is_zero() {
        let matrix = array![[1.0, 0.01], [1.0, -0.02], [1.0, 0.03], [1.0, 0.0]];
        let cov = ewma_covariance(&matrix, 5).unwrap();

        assert_relative_eq!(cov[[0, 0]], 0.0, epsilon = 1e-14);
        assert_relative_eq!(cov[[0, 1]], 0.0, epsilon = 1e-14);
        assert!(cov[[1, 1]] > 0.0);
    }

    #[test]
    fn ewma_covariance_recent_rows_dominate() {
        // Large deviation in the oldest row, small in the newest: with a
        // short half-life the newest deviation must dominate the variance
        // relative to equal weighting.
        let spiky_old = array![[10.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0]];
        let spiky_new = array![[0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [0.0], [10.0]];

        let old_var = ewma_covariance(&spiky_old, 1).unwrap()[[0, 0]];
        let new_var = ewma_covariance(&spiky_new, 1).unwrap()[[0, 0]];
        assert!(new_var > old_var * 10.0);
    }

    #[test]
    fn ewma_covariance_rejects_degenerate_input() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(ewma_covariance(&empty, 5).is_err());

        let matrix = array![[1.0, 2.0]];
        assert!(ewma_covariance(&matrix, 0).is_err());
    }

    #[test]
    fn ewma_std_uniform_weights_limit() {
        // With a huge half-life the weights are nearly uniform, so the
        // result approaches the population standard deviation.
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = ewma_std(&data, 1_000_000).unwrap();
        assert_relative_eq!(result, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn ewma_std_ignores_missing() {
        let data = [0.01, f64::NAN, 0.02, -0.01, f64::INFINITY, 0.015];
        let with_gaps = ewma_std(&data, 10).unwrap();
        let dense = ewma_std(&[0.01, 0.02, -0.01, 0.015], 10).unwrap();
        assert_relative_eq!(with_gaps, dense, epsilon = 1e-14);
    }

    #[test]
    fn ewma_std_empty_is_nan() {
        assert!(ewma_std(&[], 10).unwrap().is_nan());
        assert!(ewma_std(&[f64::NAN], 10).unwrap().is_nan());
    }
}
