//! Galerkin decomposition of a covariance kernel on piecewise linear
//! finite elements.
//!
//! The generalized eigenproblem `M C M phi = lambda M phi` is reduced to a
//! symmetric one through the Cholesky factor of the mass matrix `M = L L^T`:
//! the eigenvectors of `L^T C L` give the modes after a triangular solve.

use crate::errors::{KlError, Result};
use crate::kernels::CovarianceKernel;
use crate::mesh::Mesh;
use crate::result::KarhunenLoeveResult;
use linfa_linalg::cholesky::Cholesky;
use linfa_linalg::eigh::EighInto;
use linfa_linalg::triangular::{SolveTriangularInplace, UPLO};

/// Galerkin decomposition of a covariance kernel on a mesh.
#[derive(Clone, Debug)]
pub struct KarhunenLoeveP1 {
    threshold: f64,
    maximum_modes: usize,
}

impl KarhunenLoeveP1 {
    /// Decomposition leaving at most a `threshold` fraction of the
    /// discretized variance out of the retained modes
    pub fn new(threshold: f64) -> KarhunenLoeveP1 {
        KarhunenLoeveP1 {
            threshold,
            maximum_modes: 0,
        }
    }

    /// Cap the number of retained modes, `0` meaning no cap
    pub fn maximum_modes(mut self, maximum_modes: usize) -> Self {
        self.maximum_modes = maximum_modes;
        self
    }

    /// Decompose the kernel on the given mesh
    pub fn decompose<K: CovarianceKernel>(
        &self,
        kernel: &K,
        mesh: &Mesh,
    ) -> Result<KarhunenLoeveResult> {
        let mass = mesh.mass_matrix();
        let l = mass.cholesky().map_err(|e| {
            KlError::NumericalError(format!("mass matrix factorization failed: {e}"))
        })?;
        let cov = kernel.discretize(mesh, 0.);
        let mut b = l.t().dot(&cov).dot(&l);
        // roundoff symmetrization before the symmetric eigensolver
        let bt = b.t().to_owned();
        b += &bt;
        b.mapv_inplace(|v| 0.5 * v);

        let (eigenvalues, vectors) = b.eigh_into()?;
        // modes solve L^T phi = y, making them orthonormal against the mass
        // matrix
        let modes = l.t().solve_triangular_into(vectors, UPLO::Upper)?;
        KarhunenLoeveResult::truncate(
            mesh.clone(),
            mesh.weights(),
            eigenvalues,
            modes,
            self.threshold,
            self.maximum_modes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::SquaredExponentialKernel;
    use crate::quadrature::KarhunenLoeveQuadrature;
    use approx::assert_abs_diff_eq;

    fn kernel() -> SquaredExponentialKernel {
        SquaredExponentialKernel {
            amplitude: 1.,
            scale: 0.5,
        }
    }

    #[test]
    fn test_spectrum_sorted_non_negative() {
        let mesh = Mesh::interval(-1., 1., 64).unwrap();
        let result = KarhunenLoeveP1::new(1e-4).decompose(&kernel(), &mesh).unwrap();
        let lambda = result.eigenvalues();
        assert!(lambda.len() > 1);
        for k in 0..lambda.len() {
            assert!(lambda[k] > 0.);
            if k > 0 {
                assert!(lambda[k] <= lambda[k - 1]);
            }
        }
    }

    #[test]
    fn test_modes_orthonormal_against_mass_matrix() {
        let mesh = Mesh::interval(-1., 1., 48).unwrap();
        let result = KarhunenLoeveP1::new(1e-3).decompose(&kernel(), &mesh).unwrap();
        let modes = result.modes();
        let mass = mesh.mass_matrix();
        let gram = modes.t().dot(&mass).dot(modes);
        for i in 0..result.n_modes() {
            for j in 0..result.n_modes() {
                let expected = if i == j { 1. } else { 0. };
                assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_agrees_with_quadrature_decomposition() {
        // both discretizations converge to the same continuous spectrum
        let mesh = Mesh::interval(-1., 1., 96).unwrap();
        let p1 = KarhunenLoeveP1::new(1e-6).decompose(&kernel(), &mesh).unwrap();
        let quad = KarhunenLoeveQuadrature::new(1e-6, 48)
            .decompose(&kernel(), -1., 1.)
            .unwrap();
        for k in 0..4 {
            let a = p1.eigenvalues()[k];
            let b = quad.eigenvalues()[k];
            assert!(
                (a - b).abs() / b < 0.02,
                "mode {k}: p1 {a} vs quadrature {b}"
            );
        }
    }

    #[test]
    fn test_total_variance_matches_trace() {
        // sum of all eigenvalues approximates amplitude^2 * |domain|
        let mesh = Mesh::interval(-1., 1., 64).unwrap();
        let result = KarhunenLoeveP1::new(0.).decompose(&kernel(), &mesh).unwrap();
        assert_abs_diff_eq!(result.total_variance(), 2., epsilon = 1e-2);
    }
}
