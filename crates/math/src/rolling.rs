//! Rolling-window statistics with missing-value gates.
//!
//! All functions use the full-window convention: output position `i` is
//! missing until a complete window of `window` positions ends at `i`
//! (`i >= window - 1`), and within a complete window at least `min_valid`
//! observations must be non-missing.

use ndarray::Array1;

/// Rolling mean of the non-missing values in each full trailing window.
///
/// # Arguments
/// * `data` - Input sequence; `NaN` marks missing
/// * `window` - Window length in positions
/// * `min_valid` - Minimum non-missing observations per window
///
/// # Returns
/// Array of the same length as `data`; positions without a full window or
/// enough valid observations are `NaN`.
#[must_use]
pub fn rolling_mean(data: &[f64], window: usize, min_valid: usize) -> Array1<f64> {
    rolling_apply(data, window, |slice| {
        let valid: Vec<f64> = slice.iter().copied().filter(|x| x.is_finite()).collect();
        if valid.len() >= min_valid.max(1) {
            valid.iter().sum::<f64>() / valid.len() as f64
        } else {
            f64::NAN
        }
    })
}

/// Rolling sample standard deviation of the non-missing values in each
/// full trailing window.
///
/// As [`rolling_mean`], but at least two valid observations are always
/// required for the sample deviation to exist.
#[must_use]
pub fn rolling_std(data: &[f64], window: usize, min_valid: usize) -> Array1<f64> {
    rolling_apply(data, window, |slice| {
        let valid: Vec<f64> = slice.iter().copied().filter(|x| x.is_finite()).collect();
        if valid.len() >= min_valid.max(2) { crate::sample_std(&valid) } else { f64::NAN }
    })
}

/// Rolling regression coefficient of `stock_returns` on `bench_returns`.
///
/// The two sequences must be pre-aligned by date. Over each full trailing
/// window, pairs with both values non-missing are kept; the coefficient
/// is the sample covariance over the sample benchmark variance, clipped
/// to [-2, 3].
///
/// Missing when the pair coverage is below `min_valid_fraction * window`
/// or the benchmark variance is zero.
///
/// # Panics
/// Panics if the sequences have different lengths.
#[must_use]
pub fn rolling_beta(
    stock_returns: &[f64],
    bench_returns: &[f64],
    window: usize,
    min_valid_fraction: f64,
) -> Array1<f64> {
    assert_eq!(stock_returns.len(), bench_returns.len(), "return sequences must be aligned");

    let n = stock_returns.len();
    let mut out = Array1::from_elem(n, f64::NAN);
    if window == 0 {
        return out;
    }

    for i in (window - 1)..n {
        let start = i + 1 - window;
        let pairs: Vec<(f64, f64)> = (start..=i)
            .map(|t| (stock_returns[t], bench_returns[t]))
            .filter(|(s, b)| s.is_finite() && b.is_finite())
            .collect();

        if (pairs.len() as f64) < min_valid_fraction * window as f64 || pairs.len() < 2 {
            continue;
        }

        let m = pairs.len() as f64;
        let stock_mean = pairs.iter().map(|(s, _)| s).sum::<f64>() / m;
        let bench_mean = pairs.iter().map(|(_, b)| b).sum::<f64>() / m;

        let cov = pairs.iter().map(|(s, b)| (s - stock_mean) * (b - bench_mean)).sum::<f64>()
            / (m - 1.0);
        let var = pairs.iter().map(|(_, b)| (b - bench_mean).powi(2)).sum::<f64>() / (m - 1.0);

        if var > 0.0 {
            out[i] = (cov / var).clamp(-2.0, 3.0);
        }
    }

    out
}

fn rolling_apply(data: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Array1<f64> {
    let n = data.len();
    let mut out = Array1::from_elem(n, f64::NAN);
    if window == 0 {
        return out;
    }
    for i in (window.saturating_sub(1))..n {
        out[i] = f(&data[i + 1 - window..=i]);
    }
    out
}
