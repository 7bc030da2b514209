//! Ordinary least squares on small dense design matrices.
//!
//! The bloom model has a handful of columns (intercept, site dummies, up to
//! three winter features) and a few hundred rows at most, so a full SVD is
//! cheap and gives us both the solution and a rank test.
//!
//! Implementation choices:
//! - Solve via SVD rather than the normal equations; nalgebra's `QR::solve`
//!   is intended for square systems.
//! - Rank is decided on the column-normalized matrix with a relative
//!   tolerance on its singular values, so scaling a column does not change
//!   the verdict.
//! - Standard errors come from `σ² (XᵀX)⁻¹` with `σ² = SSE / (n - p)`.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value tolerance for rank decisions.
const RANK_RTOL: f64 = 1e-10;

/// Copy of `x` with every non-zero column scaled to unit Euclidean norm.
fn unit_columns(x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut z = x.clone();
    for mut col in z.column_iter_mut() {
        let norm = col.norm();
        if norm > 0.0 {
            col /= norm;
        }
    }
    z
}

/// Numerical rank of `x`, invariant to per-column scaling.
///
/// An all-zero column never contributes to the rank.
pub fn matrix_rank(x: &DMatrix<f64>) -> usize {
    if x.nrows() == 0 || x.ncols() == 0 {
        return 0;
    }
    let sv = unit_columns(x).svd(false, false).singular_values;
    let s_max = sv.iter().cloned().fold(0.0_f64, f64::max);
    if s_max == 0.0 {
        return 0;
    }
    let tol = s_max * RANK_RTOL * (x.nrows().max(x.ncols()) as f64);
    sv.iter().filter(|&&s| s > tol).count()
}

/// Index of the first column that is linearly dependent on the columns before it.
///
/// Returns `None` when `x` has full column rank.
pub fn first_dependent_column(x: &DMatrix<f64>) -> Option<usize> {
    let mut rank = 0;
    for j in 0..x.ncols() {
        let leading = x.columns(0, j + 1).into_owned();
        let r = matrix_rank(&leading);
        if r == rank {
            return Some(j);
        }
        rank = r;
    }
    None
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Full OLS solution with inference quantities.
#[derive(Debug, Clone)]
pub struct OlsSolution {
    pub beta: DVector<f64>,
    pub std_errors: DVector<f64>,
    pub fitted: DVector<f64>,
    pub sse: f64,
    pub sst: f64,
    pub df_resid: usize,
}

/// Fit `y ~ X` assuming `X` has full column rank and `n > p`.
///
/// Returns `None` if the solve or the covariance inversion fails numerically.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsSolution> {
    let (n, p) = x.shape();
    if n <= p || y.len() != n {
        return None;
    }

    let beta = solve_least_squares(x, y)?;
    let fitted = x * &beta;
    let resid = y - &fitted;
    let sse = resid.dot(&resid);

    let y_mean = y.mean();
    let sst = y.iter().map(|v| (v - y_mean) * (v - y_mean)).sum::<f64>();

    let df_resid = n - p;
    let sigma2 = sse / df_resid as f64;
    let xtx_inv = (x.transpose() * x).try_inverse()?;
    let std_errors = DVector::from_iterator(p, (0..p).map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt()));

    Some(OlsSolution {
        beta,
        std_errors,
        fitted,
        sse,
        sst,
        df_resid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ols_matches_textbook_example() {
        // y = [1, 3, 2, 5, 4] on x = [1..5]: slope 0.8, intercept 0.6, SSE 3.6.
        let x = DMatrix::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { (i + 1) as f64 });
        let y = DVector::from_row_slice(&[1.0, 3.0, 2.0, 5.0, 4.0]);

        let sol = ols(&x, &y).unwrap();
        assert!((sol.beta[0] - 0.6).abs() < 1e-10);
        assert!((sol.beta[1] - 0.8).abs() < 1e-10);
        assert!((sol.sse - 3.6).abs() < 1e-10);
        assert!((sol.sst - 10.0).abs() < 1e-10);
        assert_eq!(sol.df_resid, 3);
        // se(slope) = sqrt(1.2 / 10)
        assert!((sol.std_errors[1] - (0.12_f64).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn rank_detects_duplicate_column() {
        let x = DMatrix::from_row_slice(4, 3, &[
            1.0, 2.0, 4.0, //
            1.0, 3.0, 6.0, //
            1.0, 5.0, 10.0, //
            1.0, 7.0, 14.0,
        ]);
        assert_eq!(matrix_rank(&x), 2);
        assert_eq!(first_dependent_column(&x), Some(2));
    }

    #[test]
    fn constant_column_is_dependent_on_intercept() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(first_dependent_column(&x), Some(1));
    }

    #[test]
    fn rank_ignores_column_scale() {
        let x = DMatrix::from_fn(50, 2, |i, j| if j == 0 { 1.0 } else { 1e12 * i as f64 });
        assert_eq!(matrix_rank(&x), 2);
        assert_eq!(first_dependent_column(&x), None);

        let tiny = DMatrix::from_fn(50, 2, |i, j| if j == 0 { 1e6 } else { 1e-6 * i as f64 });
        assert_eq!(matrix_rank(&tiny), 2);
    }

    #[test]
    fn zero_column_is_dependent() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(matrix_rank(&x), 1);
        assert_eq!(first_dependent_column(&x), Some(1));
    }

    #[test]
    fn full_rank_has_no_dependent_column() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(first_dependent_column(&x), None);
    }
}
