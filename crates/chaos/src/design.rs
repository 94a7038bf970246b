//! Design matrix bookkeeping and dense least-squares solvers.
//!
//! Adaptive strategies evaluate many nested subsets of the same basis on the
//! same experimental design, so [`DesignProxy`] caches the basis columns and
//! assembles submatrices from the cache.

use crate::basis::ChaosBasis;
use crate::enumerate::EnumerateFunction;
use crate::errors::{ChaosError, Result};
use linfa_linalg::{cholesky::*, qr::*, svd::*, triangular::*};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Caches the evaluation of basis terms on a fixed set of points.
#[derive(Clone, Debug)]
pub struct DesignProxy<E: EnumerateFunction> {
    basis: ChaosBasis<E>,
    points: Array2<f64>,
    cache: HashMap<usize, Array1<f64>>,
}

impl<E: EnumerateFunction> DesignProxy<E> {
    /// Constructor given the basis and the standardized design points
    pub fn new(basis: ChaosBasis<E>, points: Array2<f64>) -> DesignProxy<E> {
        DesignProxy {
            basis,
            points,
            cache: HashMap::new(),
        }
    }

    /// The underlying basis
    pub fn basis(&self) -> &ChaosBasis<E> {
        &self.basis
    }

    /// The design points
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// Number of design points
    pub fn n_points(&self) -> usize {
        self.points.nrows()
    }

    /// Replace the design points, dropping every cached column
    pub fn set_points(&mut self, points: Array2<f64>) {
        self.points = points;
        self.cache.clear();
    }

    /// Column of the design matrix for one basis term
    pub fn column(&mut self, term: usize) -> Result<Array1<f64>> {
        if let Some(col) = self.cache.get(&term) {
            return Ok(col.clone());
        }
        let mut col = Array1::zeros(self.points.nrows());
        for (i, row) in self.points.rows().into_iter().enumerate() {
            col[i] = self.basis.value(term, row)?;
        }
        self.cache.insert(term, col.clone());
        Ok(col)
    }

    /// Design matrix `(n, terms.len())` of the given terms, assembled from
    /// the cache
    pub fn matrix(&mut self, terms: &[usize]) -> Result<Array2<f64>> {
        let mut phi = Array2::zeros((self.points.nrows(), terms.len()));
        for (k, &term) in terms.iter().enumerate() {
            let col = self.column(term)?;
            phi.column_mut(k).assign(&col);
        }
        Ok(phi)
    }
}

/// Dense decomposition used to solve the least-squares problems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LeastSquaresMethod {
    /// Singular value decomposition, rank-deficient problems get the
    /// minimum-norm solution
    #[default]
    Svd,
    /// QR decomposition, fails on rank-deficient problems
    Qr,
    /// Cholesky decomposition of the normal equations, fastest but least
    /// robust to ill-conditioning
    Cholesky,
}

/// Solve `min ||phi c - y||` for every column of `y`.
///
/// Returns the `(phi.ncols(), y.ncols())` coefficient matrix.
pub fn solve_least_squares(
    phi: &Array2<f64>,
    y: &Array2<f64>,
    method: LeastSquaresMethod,
) -> Result<Array2<f64>> {
    let (n, p) = phi.dim();
    if y.nrows() != n {
        return Err(ChaosError::InvalidArgumentError(format!(
            "{} observations for a design of {n} points",
            y.nrows()
        )));
    }
    if n < p {
        return Err(ChaosError::NumericalError(format!(
            "underdetermined least squares: {p} unknowns, {n} observations"
        )));
    }
    match method {
        LeastSquaresMethod::Svd => {
            let (u, s, vt) = phi.svd(true, true)?;
            let u = u.ok_or_else(|| {
                ChaosError::NumericalError("singular value decomposition without U".to_string())
            })?;
            let vt = vt.ok_or_else(|| {
                ChaosError::NumericalError("singular value decomposition without Vt".to_string())
            })?;
            let tol = f64::EPSILON * n.max(p) as f64 * s[0].max(f64::MIN_POSITIVE);
            let uty = u.t().dot(y);
            let mut scaled = Array2::zeros(uty.raw_dim());
            for (k, &sk) in s.iter().enumerate() {
                if sk > tol {
                    let row = uty.row(k).mapv(|v| v / sk);
                    scaled.row_mut(k).assign(&row);
                }
            }
            Ok(vt.t().dot(&scaled))
        }
        LeastSquaresMethod::Qr => {
            let (q, r) = phi.qr()?.into_decomp();
            let rmax = r.diag().iter().fold(0_f64, |m, &d| m.max(d.abs()));
            let tol = f64::EPSILON * n.max(p) as f64 * rmax;
            if r.diag().iter().any(|&d| d.abs() <= tol) {
                return Err(ChaosError::NumericalError(
                    "rank-deficient design matrix in QR least squares".to_string(),
                ));
            }
            let qty = q.t().dot(y);
            Ok(r.solve_triangular_into(qty, UPLO::Upper)?)
        }
        LeastSquaresMethod::Cholesky => {
            let gram = phi.t().dot(phi);
            let chol = gram.cholesky().map_err(|e| {
                ChaosError::NumericalError(format!(
                    "normal equations are not positive definite: {e}"
                ))
            })?;
            let rhs = phi.t().dot(y);
            let w = chol.solve_triangular(&rhs, UPLO::Lower)?;
            Ok(chol.t().solve_triangular_into(w, UPLO::Upper)?)
        }
    }
}
