//! Sobol' sensitivity indices read directly off the chaos coefficients.
//!
//! In an orthonormal basis the variance splits over the multi-indices, so
//! the indices only require grouping the coefficient energy by the support
//! of the multi-indices, without any further sampling.

use crate::algorithm::FunctionalChaos;
use crate::enumerate::EnumerateFunction;
use ndarray::Array2;

/// First-order and total Sobol' indices of a chaos expansion.
#[derive(Clone, Debug)]
pub struct SobolIndices {
    /// `(nx, ny)` first-order indices
    pub first_order: Array2<f64>,
    /// `(nx, ny)` total indices
    pub total_order: Array2<f64>,
}

impl<E: EnumerateFunction> FunctionalChaos<E> {
    /// Sobol' indices of every input for every output.
    ///
    /// Outputs with a vanishing variance get zero indices.
    pub fn sobol_indices(&self) -> SobolIndices {
        let nx = self.basis().dimension();
        let ny = self.coefficients().ncols();
        let variance = self.variance();
        let mut first_order = Array2::zeros((nx, ny));
        let mut total_order = Array2::zeros((nx, ny));

        for (k, alpha) in self.multi_indices().iter().enumerate() {
            let support: Vec<usize> = (0..nx).filter(|&i| alpha[i] > 0).collect();
            if support.is_empty() {
                continue;
            }
            for j in 0..ny {
                let energy = self.coefficients()[[k, j]] * self.coefficients()[[k, j]];
                for &i in &support {
                    total_order[[i, j]] += energy;
                }
                if support.len() == 1 {
                    first_order[[support[0], j]] += energy;
                }
            }
        }

        for j in 0..ny {
            if variance[j] > f64::EPSILON {
                for i in 0..nx {
                    first_order[[i, j]] /= variance[j];
                    total_order[[i, j]] /= variance[j];
                }
            } else {
                for i in 0..nx {
                    first_order[[i, j]] = 0.;
                    total_order[[i, j]] = 0.;
                }
            }
        }

        SobolIndices {
            first_order,
            total_order,
        }
    }
}
