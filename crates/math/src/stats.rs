//! Scalar statistics over finite sequences.

/// Linearly interpolated quantile of the finite values in `data`.
///
/// Uses the `(n - 1) * q` rank convention. Returns `None` when no finite
/// value exists or `q` is outside [0, 1].
#[must_use]
pub fn quantile(data: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut valid: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if valid.is_empty() {
        return None;
    }
    valid.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (valid.len() - 1) as f64 * q;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(valid[lo]);
    }
    let frac = rank - lo as f64;
    Some(valid[lo] * (1.0 - frac) + valid[hi] * frac)
}

/// Sample standard deviation (ddof = 1) of the finite values in `data`.
///
/// Returns `NaN` with fewer than two finite values.
#[must_use]
pub fn sample_std(data: &[f64]) -> f64 {
    std_with_ddof(data, 1.0)
}

/// Population standard deviation (ddof = 0) of the finite values in `data`.
///
/// Returns `NaN` when no finite value exists.
#[must_use]
pub fn population_std(data: &[f64]) -> f64 {
    std_with_ddof(data, 0.0)
}

fn std_with_ddof(data: &[f64], ddof: f64) -> f64 {
    let valid: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    let n = valid.len() as f64;
    if n <= ddof {
        return f64::NAN;
    }

    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - ddof);
    variance.sqrt()
}
