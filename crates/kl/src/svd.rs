//! Karhunen-Loeve decomposition of an empirical process sample by singular
//! value decomposition.
//!
//! The centered realizations are scaled by the square root of the mesh
//! integration weights; the right singular vectors of the scaled matrix are
//! the discrete modes and the squared singular values their variances.

use crate::errors::{KlError, Result};
use crate::process::ProcessSample;
use crate::result::KarhunenLoeveResult;
use linfa_linalg::svd::SVD;
use ndarray::Array2;

/// Empirical decomposition of a process sample.
#[derive(Clone, Debug)]
pub struct KarhunenLoeveSvd {
    threshold: f64,
    maximum_modes: usize,
    center: bool,
}

impl KarhunenLoeveSvd {
    /// Decomposition leaving at most a `threshold` fraction of the sample
    /// variance out of the retained modes
    pub fn new(threshold: f64) -> KarhunenLoeveSvd {
        KarhunenLoeveSvd {
            threshold,
            maximum_modes: 0,
            center: true,
        }
    }

    /// Cap the number of retained modes, `0` meaning no cap
    pub fn maximum_modes(mut self, maximum_modes: usize) -> Self {
        self.maximum_modes = maximum_modes;
        self
    }

    /// Subtract the empirical mean field before decomposing (the default)
    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Decompose the given sample
    pub fn decompose(&self, sample: &ProcessSample) -> Result<KarhunenLoeveResult> {
        let n = sample.len();
        if n < 2 {
            return Err(KlError::InvalidArgumentError(format!(
                "the empirical decomposition needs at least 2 realizations, got {n}"
            )));
        }
        let weights = sample.mesh().weights();
        let sqrt_w = weights.mapv(f64::sqrt);
        let values = if self.center {
            sample.centered().values().clone()
        } else {
            sample.values().clone()
        };
        let scale = 1. / ((n - 1) as f64).sqrt();
        let b = &values * &sqrt_w.view().insert_axis(ndarray::Axis(0)) * scale;

        let (_, s, vt) = b.svd(false, true)?;
        let vt = vt.ok_or_else(|| {
            KlError::NumericalError("singular value decomposition without Vt".to_string())
        })?;
        let eigenvalues = s.mapv(|sk| sk * sk);
        let m = sample.mesh().len();
        let k = vt.nrows();
        let mut modes = Array2::zeros((m, k));
        for j in 0..k {
            for i in 0..m {
                modes[[i, j]] = vt[[j, i]] / sqrt_w[i];
            }
        }
        KarhunenLoeveResult::truncate(
            sample.mesh().clone(),
            weights,
            eigenvalues,
            modes,
            self.threshold,
            self.maximum_modes,
        )
    }
}
