//! Stationary covariance kernels of one-dimensional processes.

use crate::mesh::Mesh;
use ndarray::Array2;

/// A covariance function `C(s, t)` of a second-order process.
pub trait CovarianceKernel: Clone + Send + Sync {
    /// Covariance between the process values at `s` and `t`
    fn value(&self, s: f64, t: f64) -> f64;

    /// Covariance matrix on the vertices of a mesh, with `nugget` added on
    /// the diagonal to keep it positive definite
    fn discretize(&self, mesh: &Mesh, nugget: f64) -> Array2<f64> {
        let vertices = mesh.vertices();
        let m = vertices.len();
        let mut cov = Array2::zeros((m, m));
        for i in 0..m {
            for j in 0..=i {
                let v = self.value(vertices[i], vertices[j]);
                cov[[i, j]] = v;
                cov[[j, i]] = v;
            }
            cov[[i, i]] += nugget;
        }
        cov
    }
}

/// Squared exponential kernel
/// `amplitude^2 * exp(-0.5 * ((s - t) / scale)^2)`, infinitely smooth
/// trajectories.
#[derive(Clone, Debug, PartialEq)]
pub struct SquaredExponentialKernel {
    /// Standard deviation of the process
    pub amplitude: f64,
    /// Correlation length
    pub scale: f64,
}

impl CovarianceKernel for SquaredExponentialKernel {
    fn value(&self, s: f64, t: f64) -> f64 {
        let d = (s - t) / self.scale;
        self.amplitude * self.amplitude * (-0.5 * d * d).exp()
    }
}

/// Absolute exponential kernel
/// `amplitude^2 * exp(-|s - t| / scale)`, continuous but rough
/// trajectories.
#[derive(Clone, Debug, PartialEq)]
pub struct AbsoluteExponentialKernel {
    /// Standard deviation of the process
    pub amplitude: f64,
    /// Correlation length
    pub scale: f64,
}

impl CovarianceKernel for AbsoluteExponentialKernel {
    fn value(&self, s: f64, t: f64) -> f64 {
        let d = (s - t).abs() / self.scale;
        self.amplitude * self.amplitude * (-d).exp()
    }
}
