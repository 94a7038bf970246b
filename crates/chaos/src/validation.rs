//! Validation of a metamodel against reference observations.

use crate::errors::{ChaosError, Result};
use ndarray::{Array1, Array2};

/// Comparison of metamodel predictions with reference observations on a
/// validation sample.
#[derive(Clone, Debug)]
pub struct MetaModelValidation {
    residuals: Array2<f64>,
    q2: Array1<f64>,
    rmse: Array1<f64>,
}

impl MetaModelValidation {
    /// Constructor given the `(n, ny)` reference observations and the
    /// matching metamodel predictions
    pub fn new(reference: &Array2<f64>, predictions: &Array2<f64>) -> Result<MetaModelValidation> {
        if reference.dim() != predictions.dim() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "predictions are {:?}, reference is {:?}",
                predictions.dim(),
                reference.dim()
            )));
        }
        let (n, ny) = reference.dim();
        if n < 2 {
            return Err(ChaosError::InvalidArgumentError(
                "validation needs at least two observations".to_string(),
            ));
        }
        let residuals = reference - predictions;
        let mut q2 = Array1::zeros(ny);
        let mut rmse = Array1::zeros(ny);
        for j in 0..ny {
            let col = reference.column(j);
            let mean = col.sum() / n as f64;
            let var = col.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
            let mse = residuals
                .column(j)
                .iter()
                .map(|&r| r * r)
                .sum::<f64>()
                / n as f64;
            rmse[j] = mse.sqrt();
            q2[j] = if var > f64::EPSILON {
                1. - mse / var
            } else if mse <= f64::EPSILON {
                1.
            } else {
                f64::NEG_INFINITY
            };
        }
        Ok(MetaModelValidation {
            residuals,
            q2,
            rmse,
        })
    }

    /// Residuals `reference - predictions`
    pub fn residuals(&self) -> &Array2<f64> {
        &self.residuals
    }

    /// Predictivity coefficient per output, `1` for a perfect metamodel,
    /// negative when the metamodel is worse than the reference mean
    pub fn q2(&self) -> &Array1<f64> {
        &self.q2
    }

    /// Root mean square prediction error per output
    pub fn rmse(&self) -> &Array1<f64> {
        &self.rmse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let reference = array![[1., 0.], [2., -1.], [3., 4.]];
        let validation = MetaModelValidation::new(&reference, &reference).unwrap();
        assert_abs_diff_eq!(validation.q2()[0], 1.);
        assert_abs_diff_eq!(validation.q2()[1], 1.);
        assert_abs_diff_eq!(validation.rmse()[0], 0.);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let reference = array![[0.], [2.], [4.]];
        let predictions = array![[2.], [2.], [2.]];
        let validation = MetaModelValidation::new(&reference, &predictions).unwrap();
        assert_abs_diff_eq!(validation.q2()[0], 0., epsilon = 1e-12);
        assert_abs_diff_eq!(validation.rmse()[0], (8_f64 / 3.).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_residuals_sign() {
        let reference = array![[1.], [2.]];
        let predictions = array![[0.5], [2.5]];
        let validation = MetaModelValidation::new(&reference, &predictions).unwrap();
        assert_abs_diff_eq!(validation.residuals()[[0, 0]], 0.5);
        assert_abs_diff_eq!(validation.residuals()[[1, 0]], -0.5);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let reference = array![[1.], [2.]];
        let predictions = array![[1., 2.], [3., 4.]];
        assert!(MetaModelValidation::new(&reference, &predictions).is_err());
    }

    #[test]
    fn test_sine_metamodel_predictivity() {
        // sin on [-3, 3] with a cubic expansion: the discarded spectrum is
        // tiny, so the held-out predictivity stays close to one
        use crate::algorithm::FunctionalChaos;
        use crate::distribution::{JointDistribution, Marginal};
        use crate::enumerate::LinearEnumerateFunction;
        use linfa::prelude::{Dataset, Fit};
        use ndarray::Array2;
        use ndarray_rand::rand::SeedableRng;
        use rand_xoshiro::Xoshiro256Plus;
        use uqbox_doe::{Lhs, SamplingMethod};

        let limits = array![[-3., 3.]];
        let x = Lhs::new(&limits)
            .with_rng(Xoshiro256Plus::seed_from_u64(7))
            .sample(25);
        let y = x.mapv(f64::sin);

        let distribution =
            JointDistribution::independent(vec![Marginal::uniform(-3., 3.).unwrap()]).unwrap();
        let enumerate = LinearEnumerateFunction::new(1).unwrap();
        let chaos = FunctionalChaos::params(distribution, enumerate)
            .degree(3)
            .fit(&Dataset::new(x, y))
            .unwrap();

        let xt: Array2<f64> = Lhs::new(&limits)
            .with_rng(Xoshiro256Plus::seed_from_u64(8))
            .sample(200);
        let yt = xt.mapv(f64::sin);
        let pred = chaos.predict_values(&xt).unwrap();
        let validation = MetaModelValidation::new(&yt, &pred).unwrap();
        assert!(validation.q2()[0] > 0.99);
        assert!(validation.rmse()[0] < 0.1);
    }
}
