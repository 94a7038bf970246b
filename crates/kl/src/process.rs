//! Samples of a stochastic process on a mesh, and exact sampling of
//! Gaussian processes from their discretized covariance.

use crate::errors::{KlError, Result};
use crate::kernels::CovarianceKernel;
use crate::mesh::Mesh;
use linfa_linalg::eigh::EighInto;
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, StandardNormal};

/// A set of process realizations on a common mesh, one row per realization.
#[derive(Clone, Debug)]
pub struct ProcessSample {
    mesh: Mesh,
    values: Array2<f64>,
}

impl ProcessSample {
    /// Constructor given the mesh and the `(n, m)` realization values
    pub fn new(mesh: Mesh, values: Array2<f64>) -> Result<ProcessSample> {
        if values.ncols() != mesh.len() {
            return Err(KlError::InvalidArgumentError(format!(
                "realizations have {} values for a mesh of {} vertices",
                values.ncols(),
                mesh.len()
            )));
        }
        if values.nrows() == 0 {
            return Err(KlError::InvalidArgumentError(
                "a process sample needs at least one realization".to_string(),
            ));
        }
        Ok(ProcessSample { mesh, values })
    }

    /// The common mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The realization values, one row per realization
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of realizations
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    /// A process sample always holds at least one realization
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Vertex-wise mean over the realizations
    pub fn mean_field(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(0)) / self.len() as f64
    }

    /// The sample with the mean field subtracted from every realization
    pub fn centered(&self) -> ProcessSample {
        let mean = self.mean_field();
        ProcessSample {
            mesh: self.mesh.clone(),
            values: &self.values - &mean.view().insert_axis(Axis(0)),
        }
    }
}

/// Draws Gaussian process realizations on a mesh from a covariance kernel.
///
/// The discretized covariance is diagonalized once, negative eigenvalues
/// from roundoff are clipped to zero, and realizations combine the scaled
/// eigenvectors with standard normal draws.
#[derive(Clone, Debug)]
pub struct GaussianProcessSampler {
    mesh: Mesh,
    // columns already scaled by the square root of the eigenvalues
    factor: Array2<f64>,
}

impl GaussianProcessSampler {
    /// Prepare a sampler for the kernel on the mesh
    pub fn new<K: CovarianceKernel>(kernel: &K, mesh: Mesh) -> Result<GaussianProcessSampler> {
        let cov = kernel.discretize(&mesh, 0.);
        let (values, vectors) = cov.eigh_into()?;
        let mut factor = vectors;
        for (k, &lambda) in values.iter().enumerate() {
            let scale = lambda.max(0.).sqrt();
            factor.column_mut(k).mapv_inplace(|v| v * scale);
        }
        Ok(GaussianProcessSampler { mesh, factor })
    }

    /// The mesh of the realizations
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Draw `n` realizations
    pub fn sample_with_rng(&self, n: usize, rng: &mut impl Rng) -> Result<ProcessSample> {
        if n == 0 {
            return Err(KlError::InvalidArgumentError(
                "cannot draw an empty process sample".to_string(),
            ));
        }
        let m = self.mesh.len();
        let mut z = Array2::zeros((n, m));
        for zi in z.iter_mut() {
            *zi = StandardNormal.sample(rng);
        }
        let values = z.dot(&self.factor.t());
        ProcessSample::new(self.mesh.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::SquaredExponentialKernel;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_mean_field_and_centering() {
        let mesh = Mesh::interval(0., 1., 3).unwrap();
        let sample =
            ProcessSample::new(mesh, array![[1., 2., 3.], [3., 2., 1.]]).unwrap();
        assert_abs_diff_eq!(sample.mean_field(), array![2., 2., 2.], epsilon = 1e-14);
        let centered = sample.centered();
        assert_abs_diff_eq!(centered.mean_field(), array![0., 0., 0.], epsilon = 1e-14);
        assert_abs_diff_eq!(centered.values()[[0, 0]], -1., epsilon = 1e-14);
    }

    #[test]
    fn test_sampler_variance() {
        let mesh = Mesh::interval(-1., 1., 16) .unwrap();
        let kernel = SquaredExponentialKernel {
            amplitude: 1.5,
            scale: 0.7,
        };
        let sampler = GaussianProcessSampler::new(&kernel, mesh).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let sample = sampler.sample_with_rng(4000, &mut rng).unwrap();
        // vertex-wise variance approaches amplitude^2 = 2.25
        let centered = sample.centered();
        let var = centered
            .values()
            .map_axis(ndarray::Axis(0), |col| {
                col.iter().map(|&v| v * v).sum::<f64>() / 4000.
            });
        for &v in var.iter() {
            assert_abs_diff_eq!(v, 2.25, epsilon = 0.2);
        }
    }

    #[test]
    fn test_sampler_reproducible() {
        let mesh = Mesh::interval(0., 1., 8).unwrap();
        let kernel = SquaredExponentialKernel {
            amplitude: 1.,
            scale: 0.5,
        };
        let sampler = GaussianProcessSampler::new(&kernel, mesh).unwrap();
        let a = sampler
            .sample_with_rng(3, &mut Xoshiro256Plus::seed_from_u64(7))
            .unwrap();
        let b = sampler
            .sample_with_rng(3, &mut Xoshiro256Plus::seed_from_u64(7))
            .unwrap();
        assert_abs_diff_eq!(a.values(), b.values(), epsilon = 0.);
    }

    #[test]
    fn test_inconsistent_sample_rejected() {
        let mesh = Mesh::interval(0., 1., 3).unwrap();
        assert!(ProcessSample::new(mesh, array![[1., 2.]]).is_err());
    }
}
