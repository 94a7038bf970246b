use crate::covariance_models::{CovarianceModel, SquaredExponentialCorr};
use crate::errors::{GpError, Result};
use crate::optimization::{optimize_params, prepare_multistart, CobylaParams};
use crate::parameters::{GprParams, GprValidParams, ThetaTuning};
use crate::trend_models::{ConstantTrend, TrendModel};
use crate::utils::{pairwise_differences, DiffMatrix, NormalizedData};

use linfa::prelude::{DatasetBase, Fit, Float, PredictInplace};
use linfa_linalg::{cholesky::*, eigh::*, qr::*, svd::*, triangular::*};

use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

use log::{debug, warn};
use rayon::prelude::*;
use std::fmt;

/// Minimum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MIN_EVAL: usize = 25;
/// Maximum number of tenfold nugget increases when `auto_nugget` is on
const MAX_NUGGET_RETRY: usize = 10;

/// Internal parameters computed during training,
/// used later on in prediction computations
#[derive(Default, Debug)]
pub(crate) struct GprInnerParams<F: Float> {
    /// Gaussian process variance
    sigma2: F,
    /// Generalized least-squares regression weights of the trend term
    beta: Array2<F>,
    /// Gaussian process weights
    gamma: Array2<F>,
    /// Cholesky decomposition of the correlation matrix \[R\],
    /// `None` when the model was fitted with `store_cholesky(false)`
    r_chol: Option<Array2<F>>,
    /// Solution of the linear equation system : \[R\] x Ft = F
    ft: Array2<F>,
    /// R upper triangle matrix of QR decomposition of the matrix Ft
    ft_qr_r: Array2<F>,
}

impl<F: Float> Clone for GprInnerParams<F> {
    fn clone(&self) -> Self {
        Self {
            sigma2: self.sigma2,
            beta: self.beta.to_owned(),
            gamma: self.gamma.to_owned(),
            r_chol: self.r_chol.clone(),
            ft: self.ft.to_owned(),
            ft_qr_r: self.ft_qr_r.to_owned(),
        }
    }
}

/// Gaussian process regression, also known as Kriging.
///
/// The output is modeled as the stochastic process
///
/// `Y(x) = beta^T f(x) + Z(x)`
///
/// where:
/// * `f(x)` is a vector of trend basis functions whose weights `beta`
///   are estimated by generalized least squares,
/// * `Z(x)` is a zero-mean Gaussian process with covariance
///   `sigma^2 * corr(x, x')` governed by hyperparameters `theta`
///   determined by maximizing the concentrated likelihood.
///
/// # Example
///
/// ```no_run
/// use uqbox_gp::{GaussianProcessRegression, covariance_models::*, trend_models::*};
/// use linfa::prelude::*;
/// use ndarray::{arr2, Array, Axis, Array1, Array2};
///
/// // one-dimensional test function to approximate
/// fn xsinx(x: &Array2<f64>) -> Array1<f64> {
///     ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
/// }
///
/// let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
/// let yt = xsinx(&xt);
///
/// let kriging = GaussianProcessRegression::<f64, ConstantTrend, SquaredExponentialCorr>::params(
///                 ConstantTrend::default(),
///                 SquaredExponentialCorr::default())
///                 .fit(&Dataset::new(xt, yt))
///                 .expect("Kriging trained");
///
/// let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
/// let ypred = kriging.predict(&xtest).expect("Kriging prediction");
/// let yvar = kriging.predict_var(&xtest).expect("Kriging variances");
/// ```
#[derive(Debug)]
pub struct GaussianProcessRegression<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> {
    /// Hyperparameters of the covariance model, inverse of length scales
    theta: Array1<F>,
    /// Reduced likelihood value (result from internal optimization)
    /// May be used to compare different trained models
    likelihood: F,
    /// Nugget actually used by the factorization, may be larger than the
    /// requested one when `auto_nugget` is on
    nugget: F,
    /// Gaussian process internal fitted params
    inner_params: GprInnerParams<F>,
    /// Training inputs
    xt_norm: NormalizedData<F>,
    /// Training outputs
    yt_norm: NormalizedData<F>,
    /// Training dataset (input, output)
    pub(crate) training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    pub(crate) params: GprValidParams<F, Trend, Corr>,
}

/// Kriging as GP regression special case when using constant trend and
/// squared exponential covariance
pub type Kriging<F> = GprParams<F, ConstantTrend, SquaredExponentialCorr>;

impl<F: Float> Kriging<F> {
    /// Kriging parameters constructor
    pub fn params() -> GprParams<F, ConstantTrend, SquaredExponentialCorr> {
        GprParams::new(ConstantTrend(), SquaredExponentialCorr())
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> Clone
    for GaussianProcessRegression<F, Trend, Corr>
{
    fn clone(&self) -> Self {
        Self {
            theta: self.theta.to_owned(),
            likelihood: self.likelihood,
            nugget: self.nugget,
            inner_params: self.inner_params.clone(),
            xt_norm: self.xt_norm.clone(),
            yt_norm: self.yt_norm.clone(),
            training_data: self.training_data.clone(),
            params: self.params.clone(),
        }
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> fmt::Display
    for GaussianProcessRegression<F, Trend, Corr>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GPR(trend={}, corr={}, theta={}, variance={}, likelihood={})",
            self.params.trend,
            self.params.corr,
            self.theta,
            self.inner_params.sigma2,
            self.likelihood,
        )
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>>
    GaussianProcessRegression<F, Trend, Corr>
{
    /// GP regression parameters constructor
    pub fn params<NewTrend: TrendModel<F>, NewCorr: CovarianceModel<F>>(
        trend: NewTrend,
        corr: NewCorr,
    ) -> GprParams<F, NewTrend, NewCorr> {
        GprParams::new(trend, corr)
    }

    /// Predict output values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        // Compute the trend term at x
        let f = self.params.trend.value(&xnorm);
        // Compute the correlation term at x
        let corr = self._compute_correlation(&xnorm);
        // Scaled predictor
        let y_ = &f.dot(&self.inner_params.beta) + &corr.dot(&self.inner_params.gamma);
        // Predictor
        Ok((&y_ * &self.yt_norm.std + &self.yt_norm.mean).remove_axis(Axis(1)))
    }

    /// Predict variance values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n variance values as a (n,) vector.
    ///
    /// Fails when the model was fitted with `store_cholesky(false)`.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        let corr = self._compute_correlation(&xnorm);
        let (rt, u) = self._compute_rt_u(&xnorm, &corr)?;

        let mut mse = Array::ones(rt.ncols()) - rt.mapv(|v| v * v).sum_axis(Axis(0))
            + u.mapv(|v: F| v * v).sum_axis(Axis(0));
        mse.mapv_inplace(|v| self.inner_params.sigma2 * v);

        // Mean Squared Error might be slightly negative depending on
        // machine precision: set to zero in that case
        Ok(mse.mapv(|v| if v < F::zero() { F::zero() } else { v }))
    }

    /// Compute the posterior covariance matrix between the given x points
    /// specified as a (n, nx) matrix
    fn _compute_covariance(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let xnorm = (x - &self.xt_norm.mean) / &self.xt_norm.std;
        let corr = self._compute_correlation(&xnorm);
        let (rt, u) = self._compute_rt_u(&xnorm, &corr)?;

        let cross_dx = pairwise_differences(&xnorm, &xnorm);
        let k = self.params.corr.value(&cross_dx, &self.theta);
        let k = k.into_shape((xnorm.nrows(), xnorm.nrows())).unwrap();

        let mut cov_matrix = k - rt.t().to_owned().dot(&rt) + u.t().dot(&u);
        cov_matrix.mapv_inplace(|v| self.inner_params.sigma2 * v);
        Ok(cov_matrix)
    }

    /// Compute `rt` and `u` matrices used by both variance and covariance computations
    fn _compute_rt_u(
        &self,
        xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>,
        corr: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array2<F>, Array2<F>)> {
        let inners = &self.inner_params;
        let r_chol = inners.r_chol.as_ref().ok_or_else(|| {
            GpError::NotAvailableError(
                "variance computation requires a model fitted with store_cholesky(true)"
                    .to_string(),
            )
        })?;

        let corr_t = corr.t().to_owned();
        let rt = r_chol.solve_triangular(&corr_t, UPLO::Lower)?;

        let rhs = inners.ft.t().dot(&rt) - self.params.trend.value(xnorm).t();
        let u = inners.ft_qr_r.t().solve_triangular(&rhs, UPLO::Lower)?;
        Ok((rt, u))
    }

    /// Compute correlation matrix between `xnorm` and the training set
    fn _compute_correlation(&self, xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        // Get pairwise componentwise differences with the training set
        let dx = pairwise_differences(xnorm, &self.xt_norm.data);
        // Compute the correlation function
        let r = self.params.corr.value(&dx, &self.theta);
        let n_obs = xnorm.nrows();
        let nt = self.xt_norm.data.nrows();
        r.into_shape((n_obs, nt)).unwrap()
    }

    /// Sample the conditioned Gaussian process at the given x points for
    /// `n_traj` trajectories, using the eigendecomposition of the posterior
    /// covariance matrix. Returns a (n, n_traj) matrix.
    ///
    /// Eigendecomposition is preferred over Cholesky here as the posterior
    /// covariance gets ill-conditioned as soon as x points are numerous.
    pub fn sample_with_rng(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        n_traj: usize,
        rng: &mut impl Rng,
    ) -> Result<Array2<F>> {
        let mean = self.predict(x)?.insert_axis(Axis(1));
        let cov = self._compute_covariance(x)?;
        let (v, w) = cov.eigh_into()?;
        let v = v.mapv(|x| {
            // negative values come from round-off on a PSD matrix
            if x < F::cast(1e-9) {
                return F::zero();
            }
            x.sqrt()
        });
        let c = w.dot(&Array2::from_diag(&v));
        let normal = Normal::new(0., 1.).unwrap();
        let ary = Array::random_using((x.nrows(), n_traj), normal, rng).mapv(|v| F::cast(v));
        Ok(mean + c.dot(&ary))
    }

    /// Retrieve optimized hyperparameters theta
    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    /// Estimated process variance
    pub fn variance(&self) -> F {
        self.inner_params.sigma2
    }

    /// Retrieve reduced likelihood value
    pub fn likelihood(&self) -> F {
        self.likelihood
    }

    /// Nugget used by the correlation matrix factorization
    pub fn nugget(&self) -> F {
        self.nugget
    }

    /// Retrieve input and output dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.xt_norm.ncols(), self.yt_norm.ncols())
    }
}

impl<F, D, Trend, Corr> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for GaussianProcessRegression<F, Trend, Corr>
where
    F: Float,
    D: Data<Elem = F>,
    Trend: TrendModel<F>,
    Corr: CovarianceModel<F>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        let values = self.predict(x).expect("GP prediction");
        *y = values;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GprValidParams<F, Trend, Corr>
{
    type Object = GaussianProcessRegression<F, Trend, Corr>;

    /// Fit GP parameters using maximum likelihood
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets().to_owned().insert_axis(Axis(1));
        if x.nrows() < 2 {
            return Err(GpError::InvalidValueError(format!(
                "at least 2 training points required, got {}",
                x.nrows()
            )));
        }

        let dim = x.ncols();
        let init = self.theta_tuning().init();
        let theta0 = if init.len() == 1 {
            Array1::from_elem(dim, init[0])
        } else if init.len() == dim {
            init.to_owned()
        } else {
            return Err(GpError::InvalidValueError(format!(
                "theta init should be either 1-dim or x dim ({}), got {}",
                dim,
                init.len()
            )));
        };

        let xtrain = NormalizedData::new(x);
        let ytrain = NormalizedData::new(&y);

        let x_distances = DiffMatrix::new(&xtrain.data);
        if x_distances
            .d
            .map_axis(Axis(1), |row| row.fold(F::zero(), |acc, &v| acc + v.abs()))
            .iter()
            .any(|&s| s == F::zero())
        {
            warn!("multiple x input features have the same value (at least same row twice)");
        }
        let fx = self.trend().value(&xtrain.data);

        let opt_theta = match self.theta_tuning() {
            ThetaTuning::Fixed(_) => {
                // Easy path, no optimization
                theta0
            }
            ThetaTuning::Optimized { init: _, bounds } => {
                let base: f64 = 10.;
                let objfn = |x: &[f64], _gradient: Option<&mut [f64]>, _params: &mut ()| -> f64 {
                    let theta = x
                        .iter()
                        .map(|v| F::cast(base.powf(*v)))
                        .collect::<Array1<F>>();
                    for v in theta.iter() {
                        // check theta as optimizer may return nan values
                        if v.is_nan() {
                            // shortcut return worst value wrt to rlf minimization
                            return f64::INFINITY;
                        }
                    }
                    let rxx = self.corr().value(&x_distances.d, &theta);
                    match reduced_likelihood(&fx, &rxx, &x_distances, &ytrain, self.nugget()) {
                        Ok(r) => unsafe { -(*(&r.0 as *const F as *const f64)) },
                        Err(_) => f64::INFINITY,
                    }
                };

                let bounds = if bounds.len() == 1 {
                    vec![bounds[0]; dim]
                } else if bounds.len() == dim {
                    bounds.to_vec()
                } else {
                    return Err(GpError::InvalidValueError(format!(
                        "theta bounds should be either 1-dim or x dim ({}), got {}",
                        dim,
                        bounds.len()
                    )));
                };

                let (theta_inits, bounds) = prepare_multistart(self.n_start(), &theta0, &bounds);
                debug!("Optimize with multistart theta = {theta_inits:?} and bounds = {bounds:?}");
                let opt_params = (0..theta_inits.nrows())
                    .into_par_iter()
                    .map(|i| {
                        optimize_params(
                            objfn,
                            &theta_inits.row(i).to_owned(),
                            &bounds,
                            CobylaParams {
                                maxeval: (10 * theta_inits.ncols())
                                    .clamp(GP_COBYLA_MIN_EVAL, self.max_eval()),
                                ..CobylaParams::default()
                            },
                        )
                    })
                    .reduce(
                        || (f64::INFINITY, Array::ones((theta_inits.ncols(),))),
                        |a, b| if b.0 < a.0 { b } else { a },
                    );
                opt_params.1.mapv(|v| F::cast(base.powf(v)))
            }
        };

        let rxx = self.corr().value(&x_distances.d, &opt_theta);
        let (lkh, mut inner_params, nugget) = reduced_likelihood_auto(
            &fx,
            &rxx,
            &x_distances,
            &ytrain,
            self.nugget(),
            self.auto_nugget(),
        )?;
        if !self.store_cholesky() {
            inner_params.r_chol = None;
        }
        Ok(GaussianProcessRegression {
            theta: opt_theta,
            likelihood: lkh,
            nugget,
            inner_params,
            xt_norm: xtrain,
            yt_norm: ytrain,
            training_data: (x.to_owned(), y.remove_axis(Axis(1))),
            params: self.clone(),
        })
    }
}

/// Compute the reduced likelihood, growing the nugget tenfold on Cholesky
/// failure when `auto_nugget` is on. Returns the likelihood, the inner
/// parameters and the nugget actually used.
fn reduced_likelihood_auto<F: Float>(
    fx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rxx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    x_distances: &DiffMatrix<F>,
    ytrain: &NormalizedData<F>,
    nugget: F,
    auto_nugget: bool,
) -> Result<(F, GprInnerParams<F>, F)> {
    let mut nugget = nugget;
    let mut retry = 0;
    loop {
        match reduced_likelihood(fx, rxx, x_distances, ytrain, nugget) {
            Ok((lkh, inner)) => return Ok((lkh, inner, nugget)),
            Err(GpError::LinalgError(err)) if auto_nugget && retry < MAX_NUGGET_RETRY => {
                nugget = if nugget == F::zero() {
                    F::cast(100.) * F::epsilon()
                } else {
                    nugget * F::cast(10.)
                };
                retry += 1;
                warn!("correlation matrix factorization failed ({err}), retry with nugget = {nugget}");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Compute reduced likelihood function
/// fx: trend factors term at x samples,
/// rxx: correlation factors at x samples,
/// x_distances: pairwise distances between x samples
/// ytrain: normalized output training values
/// nugget: factor to improve numerical stability
fn reduced_likelihood<F: Float>(
    fx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rxx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    x_distances: &DiffMatrix<F>,
    ytrain: &NormalizedData<F>,
    nugget: F,
) -> Result<(F, GprInnerParams<F>)> {
    // Set up R
    let mut r_mx: Array2<F> = Array2::<F>::eye(x_distances.n_obs).mapv(|v| v + v * nugget);
    for (i, ij) in x_distances.d_indices.outer_iter().enumerate() {
        r_mx[[ij[0], ij[1]]] = rxx[[i, 0]];
        r_mx[[ij[1], ij[0]]] = rxx[[i, 0]];
    }
    // R cholesky decomposition
    let r_chol = r_mx.cholesky()?;
    // Solve generalized least squares problem
    let ft = r_chol.solve_triangular(fx, UPLO::Lower)?;
    let (ft_qr_q, ft_qr_r) = ft.qr()?.into_decomp();

    // Check whether we have an ill-conditioned problem
    let (_, sv_qr_r, _) = ft_qr_r.svd(false, false)?;
    let cond_ft = sv_qr_r[sv_qr_r.len() - 1] / sv_qr_r[0];
    if F::cast(cond_ft) < F::cast(1e-10) {
        let (_, sv_f, _) = &fx.svd(false, false)?;
        let cond_fx = sv_f[0] / sv_f[sv_f.len() - 1];
        if F::cast(cond_fx) > F::cast(1e15) {
            return Err(GpError::LikelihoodComputationError(
                "F is too ill conditioned. Poor combination \
                of trend model and observations."
                    .to_string(),
            ));
        } else {
            // ft is too ill conditioned, get out (try different theta)
            return Err(GpError::LikelihoodComputationError(
                "ft is too ill conditioned, try another theta again".to_string(),
            ));
        }
    }
    let yt = r_chol.solve_triangular(&ytrain.data, UPLO::Lower)?;

    let beta = ft_qr_r.solve_triangular_into(ft_qr_q.t().dot(&yt), UPLO::Upper)?;
    let rho = yt - ft.dot(&beta);
    let rho_sqr = rho.mapv(|v| v * v).sum_axis(Axis(0));

    let gamma = r_chol.t().solve_triangular_into(rho, UPLO::Upper)?;
    // The determinant of R is equal to the squared product of
    // the diagonal elements of its Cholesky decomposition r_chol
    let n_obs: F = F::cast(x_distances.n_obs);

    let logdet = r_chol.diag().mapv(|v: F| v.log10()).sum() * F::cast(2.) / n_obs;

    // Reduced likelihood
    let sigma2 = rho_sqr / n_obs;
    let reduced_likelihood = -n_obs * (sigma2.sum().log10() + logdet);

    Ok((
        reduced_likelihood,
        GprInnerParams {
            sigma2: sigma2[0] * ytrain.std[0] * ytrain.std[0],
            beta,
            gamma,
            r_chol: Some(r_chol),
            ft,
            ft_qr_r,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance_models::*;
    use crate::trend_models::*;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::Dataset;
    use ndarray::{arr1, arr2, array};
    use ndarray_rand::rand::SeedableRng;
    use paste::paste;
    use rand_xoshiro::Xoshiro256Plus;

    fn xsinx(x: &Array2<f64>) -> Array1<f64> {
        (x * x.mapv(|v| v.sin())).remove_axis(Axis(1))
    }

    #[test]
    fn test_kriging_interpolation_xsinx() {
        // 8 training points spread over [0, 10]
        let xt = arr2(&[[0.], [1.5], [3.], [4.5], [6.], [7.5], [9.], [10.]]);
        let yt = xsinx(&xt);
        let gp = GaussianProcessRegression::<f64, QuadraticTrend, SquaredExponentialCorr>::params(
            QuadraticTrend::default(),
            SquaredExponentialCorr::default(),
        )
        .theta_tuning(ThetaTuning::Fixed(arr1(&[0.5])))
        .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
        .expect("GP fitted");

        // interpolation: residuals vanish and variance collapses at training points
        let ypred = gp.predict(&xt).expect("prediction");
        let yvar = gp.predict_var(&xt).expect("variances");
        for i in 0..xt.nrows() {
            assert_abs_diff_eq!(ypred[i], yt[i], epsilon = 1e-10);
            assert!(yvar[i].abs() < 1e-6);
        }
    }

    #[test]
    fn test_kriging_prediction_quality() {
        let xt = arr2(&[[0.], [1.5], [3.], [4.5], [6.], [7.5], [9.], [10.]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt, yt))
            .expect("GP fitted");

        let xtest = arr2(&[[2.1], [5.3], [8.7]]);
        let ytest = xsinx(&xtest);
        let ypred = gp.predict(&xtest).expect("prediction");
        for i in 0..xtest.nrows() {
            assert_abs_diff_eq!(ypred[i], ytest[i], epsilon = 2e-1);
        }
    }

    macro_rules! test_gpr_trend {
        ($trend:ident) => {
            paste! {
                #[test]
                fn [<test_gpr_ $trend:snake _trend>]() {
                    let xt = arr2(&[[0.], [2.], [4.], [6.], [8.], [10.]]);
                    let yt = xsinx(&xt);
                    let gp = GaussianProcessRegression::<
                        f64,
                        [<$trend Trend>],
                        Matern52Corr,
                    >::params([<$trend Trend>]::default(), Matern52Corr::default())
                    .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                    .expect("GP fitted");
                    let ypred = gp.predict(&xt).expect("prediction");
                    for i in 0..xt.nrows() {
                        assert_abs_diff_eq!(ypred[i], yt[i], epsilon = 1e-6);
                    }
                }
            }
        };
    }

    test_gpr_trend!(Constant);
    test_gpr_trend!(Linear);
    test_gpr_trend!(Quadratic);

    #[test]
    fn test_store_cholesky_disabled() {
        let xt = arr2(&[[0.], [2.], [4.], [6.]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .store_cholesky(false)
            .fit(&Dataset::new(xt.to_owned(), yt))
            .expect("GP fitted");
        assert!(gp.predict(&xt).is_ok());
        assert!(matches!(
            gp.predict_var(&xt),
            Err(GpError::NotAvailableError(_))
        ));
    }

    #[test]
    fn test_auto_nugget_growth() {
        let env = env_logger::Env::new().filter_or("UQBOX_LOG", "info");
        let mut builder = env_logger::Builder::from_env(env);
        builder.target(env_logger::Target::Stdout).try_init().ok();
        // a fake correlation value > 1 makes R non positive definite until
        // the nugget has grown enough
        let x = arr2(&[[0.], [1.]]);
        let x_distances = DiffMatrix::new(&x);
        let fx = Array2::<f64>::ones((2, 1));
        let ytrain = NormalizedData::new(&arr2(&[[0.], [1.]]));
        let rxx = arr2(&[[1.5]]);

        let res = reduced_likelihood_auto(&fx, &rxx, &x_distances, &ytrain, 0.01, false);
        assert!(matches!(res, Err(GpError::LinalgError(_))));

        let (_, _, nugget) = reduced_likelihood_auto(&fx, &rxx, &x_distances, &ytrain, 0.01, true)
            .expect("likelihood computed thanks to nugget growth");
        assert_abs_diff_eq!(nugget, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_theta_dim() {
        let xt = arr2(&[[0., 0.], [1., 1.], [2., 0.5]]);
        let yt = arr1(&[0., 1., 2.]);
        let res = Kriging::params()
            .theta_tuning(ThetaTuning::Fixed(arr1(&[0.1, 0.1, 0.1])))
            .fit(&Dataset::new(xt, yt));
        assert!(matches!(res, Err(GpError::InvalidValueError(_))));
    }

    #[test]
    fn test_sampling_at_training_points() {
        let xt = arr2(&[[0.], [3.], [6.], [9.]]);
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
            .expect("GP fitted");
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let trajs = gp
            .sample_with_rng(&xt, 10, &mut rng)
            .expect("GP sampling");
        assert_eq!(trajs.dim(), (4, 10));
        // trajectories pass through the training points
        for traj in trajs.columns() {
            for i in 0..xt.nrows() {
                assert_abs_diff_eq!(traj[i], yt[i], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_display() {
        let xt = array![[0.], [3.], [6.]];
        let yt = xsinx(&xt);
        let gp = Kriging::params()
            .fit(&Dataset::new(xt, yt))
            .expect("GP fitted");
        let repr = format!("{gp}");
        assert!(repr.contains("SquaredExponential"));
    }
}
