//! A module for metrics to evaluate Gaussian process model performances
//! through cross validation.

use linfa::dataset::Dataset;
use linfa::{
    traits::{Fit, Predict, PredictInplace},
    Float, ParamGuard,
};
use ndarray::{Array1, Array2};

use crate::{
    covariance_models::CovarianceModel, trend_models::TrendModel, GaussianProcessRegression,
    GpError, GprParams,
};

/// A trait for Q2 predictive coefficient cross validation score
pub trait PredictScore<F, ER, P, O>
where
    F: Float,
    ER: std::error::Error + From<linfa::error::Error>,
    P: Fit<Array2<F>, Array1<F>, ER, Object = O> + ParamGuard,
    O: PredictInplace<Array2<F>, Array1<F>>,
{
    /// Return the training data (xt, yt)
    fn training_data(&self) -> &(Array2<F>, Array1<F>);

    /// Return the model parameters
    fn params(&self) -> P;

    /// Compute quality metric Q2 with kfold cross validation
    fn q2_score(&self, kfold: usize) -> F {
        let (xt, yt) = self.training_data();
        let dataset = Dataset::new(xt.to_owned(), yt.to_owned());
        let yt_mean = yt.mean().unwrap();
        // Predictive Residual Sum of Squares
        let mut press = F::zero();
        // Total Sum of Squares
        let mut tss = F::zero();
        for (train, valid) in dataset.fold(kfold).into_iter() {
            let params = self.params();
            let model: O = params
                .fit(&train)
                .expect("cross-validation: sub model fitted");
            let pred = model.predict(valid.records());
            press += (valid.targets() - pred).mapv(|v| v * v).sum();
            tss += (valid.targets() - yt_mean).mapv(|v| v * v).sum();
        }
        F::one() - press / tss
    }

    /// Q2 predictive coefficient with Leave-One-Out cross validation
    fn looq2_score(&self) -> F {
        self.q2_score(self.training_data().0.nrows())
    }
}

impl<F, Trend, Corr> PredictScore<F, GpError, GprParams<F, Trend, Corr>, Self>
    for GaussianProcessRegression<F, Trend, Corr>
where
    F: Float,
    Trend: TrendModel<F>,
    Corr: CovarianceModel<F>,
{
    fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    fn params(&self) -> GprParams<F, Trend, Corr> {
        GprParams(self.params.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Kriging;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2, Axis};

    fn xsinx(x: &Array2<f64>) -> Array1<f64> {
        (x * x.mapv(|v| v.sin())).remove_axis(Axis(1))
    }

    #[test]
    fn test_q2_kriging_xsinx() {
        let xt = Array1::linspace(0., 10., 30).insert_axis(Axis(1));
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt, yt))
            .expect("GP fitted");

        assert_abs_diff_eq!(gp.q2_score(5), 1., epsilon = 1e-2);
        assert_abs_diff_eq!(gp.looq2_score(), 1., epsilon = 1e-2);
    }
}
