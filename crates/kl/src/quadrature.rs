//! Nystrom decomposition of a covariance kernel on a Gauss-Legendre rule.
//!
//! The integral eigenproblem is collocated on the quadrature nodes: with
//! `W` the diagonal of the Lebesgue weights, the symmetric matrix
//! `sqrt(W) C sqrt(W)` carries the spectrum and its eigenvectors scale back
//! to modes orthonormal against the discrete inner product.

use crate::errors::{KlError, Result};
use crate::kernels::CovarianceKernel;
use crate::mesh::Mesh;
use crate::result::KarhunenLoeveResult;
use linfa_linalg::eigh::EighInto;
use ndarray::Array2;
use uqbox_doe::gauss_legendre;

/// Collocation decomposition of a covariance kernel on an interval.
#[derive(Clone, Debug)]
pub struct KarhunenLoeveQuadrature {
    threshold: f64,
    n_nodes: usize,
    maximum_modes: usize,
}

impl KarhunenLoeveQuadrature {
    /// Decomposition on `n_nodes` Gauss-Legendre nodes, leaving at most a
    /// `threshold` fraction of the discretized variance out of the retained
    /// modes
    pub fn new(threshold: f64, n_nodes: usize) -> KarhunenLoeveQuadrature {
        KarhunenLoeveQuadrature {
            threshold,
            n_nodes,
            maximum_modes: 0,
        }
    }

    /// Cap the number of retained modes, `0` meaning no cap
    pub fn maximum_modes(mut self, maximum_modes: usize) -> Self {
        self.maximum_modes = maximum_modes;
        self
    }

    /// Decompose the kernel over `[a, b]`
    pub fn decompose<K: CovarianceKernel>(
        &self,
        kernel: &K,
        a: f64,
        b: f64,
    ) -> Result<KarhunenLoeveResult> {
        if a >= b {
            return Err(KlError::InvalidArgumentError(format!(
                "domain bounds must be increasing, got [{a}, {b}]"
            )));
        }
        if self.n_nodes < 2 {
            return Err(KlError::InvalidArgumentError(format!(
                "the collocation rule needs at least 2 nodes, got {}",
                self.n_nodes
            )));
        }
        let (nodes01, prob_weights) = gauss_legendre::<f64>(self.n_nodes);
        let nodes = nodes01.mapv(|x| a + 0.5 * (x + 1.) * (b - a));
        // probability weights of the rule scaled to the Lebesgue measure
        let weights = prob_weights.mapv(|w| w * (b - a));
        let mesh = Mesh::from_vertices(nodes)?;

        let cov = kernel.discretize(&mesh, 0.);
        let sqrt_w = weights.mapv(f64::sqrt);
        let m = self.n_nodes;
        let mut sym = Array2::zeros((m, m));
        for i in 0..m {
            for j in 0..m {
                sym[[i, j]] = sqrt_w[i] * cov[[i, j]] * sqrt_w[j];
            }
        }
        let (eigenvalues, vectors) = sym.eigh_into()?;
        let mut modes = vectors;
        for i in 0..m {
            let s = 1. / sqrt_w[i];
            modes.row_mut(i).mapv_inplace(|v| v * s);
        }
        KarhunenLoeveResult::truncate(
            mesh,
            weights,
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
    use crate::kernels::{AbsoluteExponentialKernel, SquaredExponentialKernel};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_total_variance_is_exact_trace() {
        // sum_i w_i C(x_i, x_i) = amplitude^2 * (b - a), exactly
        let kernel = SquaredExponentialKernel {
            amplitude: 1.,
            scale: 0.4,
        };
        let result = KarhunenLoeveQuadrature::new(0., 32)
            .decompose(&kernel, -1., 1.)
            .unwrap();
        assert_abs_diff_eq!(result.total_variance(), 2., epsilon = 1e-10);
    }

    #[test]
    fn test_modes_orthonormal_in_weighted_product() {
        let kernel = AbsoluteExponentialKernel {
            amplitude: 1.,
            scale: 1.,
        };
        let result = KarhunenLoeveQuadrature::new(1e-3, 40)
            .decompose(&kernel, -1., 1.)
            .unwrap();
        let modes = result.modes();
        let w = result.weights();
        for i in 0..result.n_modes() {
            for j in 0..result.n_modes() {
                let dot: f64 = (0..modes.nrows())
                    .map(|r| w[r] * modes[[r, i]] * modes[[r, j]])
                    .sum();
                let expected = if i == j { 1. } else { 0. };
                assert_abs_diff_eq!(dot, expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_smooth_kernel_compresses_fast() {
        // the squared exponential spectrum decays much faster than the
        // absolute exponential one
        let smooth = SquaredExponentialKernel {
            amplitude: 1.,
            scale: 1.,
        };
        let rough = AbsoluteExponentialKernel {
            amplitude: 1.,
            scale: 1.,
        };
        let smooth_result = KarhunenLoeveQuadrature::new(1e-3, 48)
            .decompose(&smooth, -1., 1.)
            .unwrap();
        let rough_result = KarhunenLoeveQuadrature::new(1e-3, 48)
            .decompose(&rough, -1., 1.)
            .unwrap();
        assert!(smooth_result.n_modes() < rough_result.n_modes());
    }

    #[test]
    fn test_invalid_arguments() {
        let kernel = SquaredExponentialKernel {
            amplitude: 1.,
            scale: 1.,
        };
        assert!(KarhunenLoeveQuadrature::new(1e-3, 16)
            .decompose(&kernel, 1., -1.)
            .is_err());
        assert!(KarhunenLoeveQuadrature::new(1e-3, 1)
            .decompose(&kernel, -1., 1.)
            .is_err());
    }
}
