//! Truncated Karhunen-Loeve decompositions and the projection and lifting
//! operators they carry.

use crate::errors::{KlError, Result};
use crate::mesh::Mesh;
use crate::process::ProcessSample;
use log::warn;
use ndarray::{Array1, Array2, Axis};

// eigenvalues below this fraction of the largest one are treated as zero
const EIGENVALUE_CLIP: f64 = 1e-12;

/// A truncated decomposition `f ~ sum_k sqrt(lambda_k) xi_k phi_k`.
///
/// Modes are orthonormal against the discrete inner product defined by the
/// integration weights of the mesh.
#[derive(Clone, Debug)]
pub struct KarhunenLoeveResult {
    mesh: Mesh,
    weights: Array1<f64>,
    /// retained eigenvalues, decreasing
    eigenvalues: Array1<f64>,
    /// `(m, k)` retained modes as columns
    modes: Array2<f64>,
    threshold: f64,
    total_variance: f64,
}

impl KarhunenLoeveResult {
    /// Truncate a full spectrum: negative eigenvalues from roundoff are
    /// clipped, modes are sorted by decreasing eigenvalue, and the smallest
    /// leading subset leaving at most a `threshold` fraction of the variance
    /// is retained, capped at `maximum_modes` when non-zero.
    pub(crate) fn truncate(
        mesh: Mesh,
        weights: Array1<f64>,
        eigenvalues: Array1<f64>,
        modes: Array2<f64>,
        threshold: f64,
        maximum_modes: usize,
    ) -> Result<KarhunenLoeveResult> {
        let lambda_max = eigenvalues.iter().cloned().fold(0_f64, f64::max);
        if lambda_max <= 0. {
            return Err(KlError::NumericalError(
                "the discretized covariance has no positive eigenvalue".to_string(),
            ));
        }
        let negative = eigenvalues.iter().filter(|&&l| l < 0.).count();
        if negative > 0 {
            warn!("clipping {negative} negative eigenvalues of the discretized covariance");
        }
        let clipped: Vec<f64> = eigenvalues
            .iter()
            .map(|&l| if l > EIGENVALUE_CLIP * lambda_max { l } else { 0. })
            .collect();
        let mut order: Vec<usize> = (0..clipped.len()).collect();
        order.sort_by(|&a, &b| clipped[b].partial_cmp(&clipped[a]).unwrap());

        let total: f64 = clipped.iter().sum();
        let mut cumulated = 0.;
        let mut retained = 0;
        for &k in &order {
            if clipped[k] <= 0. {
                break;
            }
            cumulated += clipped[k];
            retained += 1;
            if (total - cumulated) / total <= threshold {
                break;
            }
        }
        if maximum_modes > 0 {
            retained = retained.min(maximum_modes);
        }

        let kept = &order[..retained];
        let eigenvalues = Array1::from_iter(kept.iter().map(|&k| clipped[k]));
        let modes = modes.select(Axis(1), kept);
        Ok(KarhunenLoeveResult {
            mesh,
            weights,
            eigenvalues,
            modes,
            threshold,
            total_variance: total,
        })
    }

    /// The mesh of the modes
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The integration weights defining the discrete inner product
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Retained eigenvalues, decreasing
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Retained modes, one column per mode
    pub fn modes(&self) -> &Array2<f64> {
        &self.modes
    }

    /// Number of retained modes
    pub fn n_modes(&self) -> usize {
        self.eigenvalues.len()
    }

    /// The truncation threshold the decomposition was built with
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Variance of the discretized process before truncation
    pub fn total_variance(&self) -> f64 {
        self.total_variance
    }

    /// Fraction of the total variance carried by the retained modes
    pub fn variance_fraction(&self) -> f64 {
        self.eigenvalues.sum() / self.total_variance
    }

    /// Modes scaled by the square root of their eigenvalue, so their
    /// squared norm matches their variance contribution
    pub fn scaled_modes(&self) -> Array2<f64> {
        let mut scaled = self.modes.clone();
        for (k, &lambda) in self.eigenvalues.iter().enumerate() {
            let s = lambda.sqrt();
            scaled.column_mut(k).mapv_inplace(|v| v * s);
        }
        scaled
    }

    /// Coordinates `xi_k = <f, phi_k> / sqrt(lambda_k)` of one realization
    pub fn project(&self, field: &Array1<f64>) -> Result<Array1<f64>> {
        if field.len() != self.mesh.len() {
            return Err(KlError::InvalidArgumentError(format!(
                "field has {} values for a mesh of {} vertices",
                field.len(),
                self.mesh.len()
            )));
        }
        let weighted = field * &self.weights;
        let mut xi = self.modes.t().dot(&weighted);
        for (k, &lambda) in self.eigenvalues.iter().enumerate() {
            xi[k] /= lambda.sqrt();
        }
        Ok(xi)
    }

    /// Coordinates of every realization of a sample, `(n, k)`
    pub fn project_sample(&self, sample: &ProcessSample) -> Result<Array2<f64>> {
        if sample.mesh() != &self.mesh {
            return Err(KlError::ConfigurationError(
                "the sample lives on a different mesh than the modes".to_string(),
            ));
        }
        let mut xi = Array2::zeros((sample.len(), self.n_modes()));
        for (i, row) in sample.values().rows().into_iter().enumerate() {
            let coords = self.project(&row.to_owned())?;
            xi.row_mut(i).assign(&coords);
        }
        Ok(xi)
    }

    /// Rebuild a realization from its coordinates, inverse of
    /// [`KarhunenLoeveResult::project`] on the retained subspace
    pub fn lift(&self, xi: &Array1<f64>) -> Result<Array1<f64>> {
        if xi.len() != self.n_modes() {
            return Err(KlError::InvalidArgumentError(format!(
                "{} coordinates for {} retained modes",
                xi.len(),
                self.n_modes()
            )));
        }
        let mut scaled = xi.clone();
        for (k, &lambda) in self.eigenvalues.iter().enumerate() {
            scaled[k] *= lambda.sqrt();
        }
        Ok(self.modes.dot(&scaled))
    }
}
