//! Dense linear algebra for factor estimation.

use ndarray::{Array1, Array2};

use crate::MathError;

const PIVOT_TOLERANCE: f64 = 1e-14;

/// Result of a ridge-capable weighted least squares regression.
#[derive(Debug, Clone)]
pub struct WlsSolution {
    /// Estimated coefficients.
    pub coefficients: Array1<f64>,
    /// Residuals against the unweighted observations.
    pub residuals: Array1<f64>,
    /// Whether ridge regularization was applied.
    pub ridged: bool,
}

/// Determinant via Gaussian elimination with partial pivoting.
///
/// Returns 0.0 for a singular matrix and `NaN` for a non-square one.
#[must_use]
pub fn determinant(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    if a.ncols() != n {
        return f64::NAN;
    }
    if n == 0 {
        return 1.0;
    }

    let mut m = a.clone();
    let mut det = 1.0;

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = m[[col, col]].abs();
        for row in (col + 1)..n {
            if m[[row, col]].abs() > max_val {
                max_val = m[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < PIVOT_TOLERANCE {
            return 0.0;
        }

        if max_row != col {
            for j in 0..n {
                m.swap([col, j], [max_row, j]);
            }
            det = -det;
        }

        det *= m[[col, col]];

        for row in (col + 1)..n {
            let factor = m[[row, col]] / m[[col, col]];
            for j in col..n {
                m[[row, j]] -= factor * m[[col, j]];
            }
        }
    }

    det
}

/// Invert a square matrix by Gauss-Jordan elimination with partial
/// pivoting.
///
/// # Errors
/// Returns `MathError::Singular` when a pivot falls below tolerance and
/// `MathError::DimensionMismatch` for a non-square input.
pub fn invert_matrix(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: a.ncols() });
    }
    if n == 0 {
        return Err(MathError::EmptyData);
    }

    // Augmented [A | I].
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < PIVOT_TOLERANCE || !max_val.is_finite() {
            return Err(MathError::Singular);
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Ok(inv)
}

/// Weighted least squares with a ridge fallback on rank deficiency.
///
/// Solves `f = (X'WX)^-1 X'Wy` by direct inverse, where `weights` is the
/// diagonal of W. When `det(X'WX)` is zero or non-finite, `ridge_lambda`
/// times the identity is added before inversion.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` on shape errors and
/// `MathError::Singular` when the system cannot be inverted even after
/// regularization.
pub fn wls_ridge(
    x: &Array2<f64>,
    y: &Array1<f64>,
    weights: &Array1<f64>,
    ridge_lambda: f64,
) -> Result<WlsSolution, MathError> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if weights.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: weights.len() });
    }
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }

    // X'WX and X'Wy with W applied row-wise.
    let mut xw = x.clone();
    for i in 0..n {
        for j in 0..p {
            xw[[i, j]] *= weights[i];
        }
    }
    let mut xtwx = x.t().dot(&xw);
    let xtwy = xw.t().dot(y);

    let det = determinant(&xtwx);
    let ridged = det == 0.0 || !det.is_finite();
    if ridged {
        for j in 0..p {
            xtwx[[j, j]] += ridge_lambda;
        }
    }

    let inverse = invert_matrix(&xtwx)?;
    let coefficients = inverse.dot(&xtwy);

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    Ok(WlsSolution { coefficients, residuals, ridged })
}

/// Eigenvalues of a symmetric matrix by the cyclic Jacobi method,
/// ascending.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` for a non-square input.
pub fn symmetric_eigenvalues(a: &Array2<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: a.ncols() });
    }
    if n == 0 {
        return Ok(Array1::zeros(0));
    }

    let mut m = a.clone();
    let frobenius: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let tolerance = 1e-14 * frobenius.max(1.0);

    for _sweep in 0..100 {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| m[[p, q]] * m[[p, q]])
            .sum::<f64>()
            .sqrt();
        if off <= tolerance {
            break;
        }

        for p in 0..n - 1 {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() <= tolerance / (n * n) as f64 {
                    continue;
                }

                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = t * c;

                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|i| m[[i, i]]).collect();
    eigenvalues.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Array1::from_vec(eigenvalues))
}

/// Lift a symmetric matrix to positive definiteness.
///
/// When the smallest eigenvalue is non-positive, adds
/// `(|min eigenvalue| + epsilon)` to the diagonal. Returns the possibly
/// adjusted matrix and the adjustment applied, if any.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` for a non-square input.
pub fn lift_positive_definite(
    cov: &Array2<f64>,
    epsilon: f64,
) -> Result<(Array2<f64>, Option<f64>), MathError> {
    let eigenvalues = symmetric_eigenvalues(cov)?;
    let min_eigenvalue = eigenvalues.first().copied().unwrap_or(0.0);

    if min_eigenvalue > 0.0 {
        return Ok((cov.clone(), None));
    }

    let adjustment = min_eigenvalue.abs() + epsilon;
    let mut lifted = cov.clone();
    for i in 0..lifted.nrows() {
        lifted[[i, i]] += adjustment;
    }
    Ok((lifted, Some(adjustment)))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn determinant_known_values() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        assert_relative_eq!(determinant(&a), -2.0, epsilon = 1e-12);

        let singular = array![[1.0, 2.0], [2.0, 4.0]];
        assert_relative_eq!(determinant(&singular), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn invert_round_trips() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert_matrix(&a).unwrap();
        let product = a.dot(&inv);

        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[[i, j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn invert_singular_fails() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(invert_matrix(&a), Err(MathError::Singular)));
    }

    #[test]
    fn wls_known_factor_returns() {
        // Three securities, two factors, unit weights: f = (X'X)^-1 X'y.
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let y = array![0.01, 0.02, 0.03];
        let weights = array![1.0, 1.0, 1.0];

        let solution = wls_ridge(&x, &y, &weights, 0.01).unwrap();
        assert!(!solution.ridged);
        assert_relative_eq!(solution.coefficients[0], 0.01, epsilon = 1e-10);
        assert_relative_eq!(solution.coefficients[1], 0.02, epsilon = 1e-10);
        for r in &solution.residuals {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn wls_singular_design_falls_back_to_ridge() {
        // Second column is all zero: X'WX is singular.
        let x = array![[1.0, 0.0], [1.0, 0.0]];
        let y = array![0.01, 0.02];
        let weights = array![1.0, 1.0];

        let solution = wls_ridge(&x, &y, &weights, 0.01).unwrap();
        assert!(solution.ridged);
        assert!(solution.coefficients.iter().all(|c| c.is_finite()));
        assert!(solution.coefficients.iter().any(|c| c.abs() > 0.0));
        assert!(solution.residuals.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn wls_weighting_tilts_the_fit() {
        let x = array![[1.0], [1.0]];
        let y = array![0.0, 1.0];

        let balanced = wls_ridge(&x, &y, &array![1.0, 1.0], 0.0).unwrap();
        assert_relative_eq!(balanced.coefficients[0], 0.5, epsilon = 1e-12);

        let tilted = wls_ridge(&x, &y, &array![1.0, 3.0], 0.0).unwrap();
        assert_relative_eq!(tilted.coefficients[0], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn eigenvalues_of_diagonal_matrix() {
        let a = array![[3.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 2.0]];
        let eig = symmetric_eigenvalues(&a).unwrap();
        assert_relative_eq!(eig[0], -1.0, epsilon = 1e-10);
        assert_relative_eq!(eig[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(eig[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn eigenvalues_of_symmetric_matrix() {
        // Eigenvalues of [[2,1],[1,2]] are 1 and 3.
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let eig = symmetric_eigenvalues(&a).unwrap();
        assert_relative_eq!(eig[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(eig[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn lift_fixes_indefinite_matrix() {
        let cov = array![[1.0, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, -0.01]];
        let (lifted, adjustment) = lift_positive_definite(&cov, 1e-6).unwrap();

        assert!(adjustment.is_some());
        assert_relative_eq!(adjustment.unwrap(), 0.01 + 1e-6, epsilon = 1e-12);

        let eig = symmetric_eigenvalues(&lifted).unwrap();
        assert!(eig[0] >= 1e-6 - 1e-12);
    }

    #[test]
    fn lift_leaves_definite_matrix_alone() {
        let cov = array![[1.0, 0.2], [0.2, 1.0]];
        let (lifted, adjustment) = lift_positive_definite(&cov, 1e-6).unwrap();
        assert!(adjustment.is_none());
        assert_relative_eq!(lifted[[0, 0]], 1.0, epsilon = 1e-14);
    }
}
