use crate::covariance_models::{CovarianceModel, SquaredExponentialCorr};
use crate::errors::GpError;
use crate::trend_models::{ConstantTrend, TrendModel};
use linfa::{Float, ParamGuard};
use ndarray::Array1;

/// Default initial guess for `theta` hyperparameters
pub const THETA_DEFAULT_INIT: f64 = 1e-2;
/// Default bounds for `theta` hyperparameters optimization
pub const THETA_DEFAULT_BOUNDS: (f64, f64) = (1e-6, 1e2);

/// Strategy for the `theta` hyperparameters of the covariance model.
#[derive(Clone, Debug, PartialEq)]
pub enum ThetaTuning<F: Float> {
    /// Hyperparameters are held fixed at the given values, no optimization
    Fixed(Array1<F>),
    /// Hyperparameters are optimized by likelihood maximization starting
    /// from `init` within `bounds`
    Optimized {
        /// Initial guess, either one value broadcast to all dimensions
        /// or one value per dimension
        init: Array1<F>,
        /// Bounds, either a single interval broadcast to all dimensions
        /// or one interval per dimension
        bounds: Vec<(F, F)>,
    },
}

impl<F: Float> Default for ThetaTuning<F> {
    fn default() -> Self {
        ThetaTuning::Optimized {
            init: Array1::from_elem(1, F::cast(THETA_DEFAULT_INIT)),
            bounds: vec![(
                F::cast(THETA_DEFAULT_BOUNDS.0),
                F::cast(THETA_DEFAULT_BOUNDS.1),
            )],
        }
    }
}

impl<F: Float> ThetaTuning<F> {
    /// Initial value of theta whatever the tuning
    pub fn init(&self) -> &Array1<F> {
        match self {
            ThetaTuning::Fixed(init) => init,
            ThetaTuning::Optimized { init, .. } => init,
        }
    }
}

/// A set of validated parameters for Gaussian process regression.
#[derive(Clone, Debug)]
pub struct GprValidParams<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> {
    /// Trend model of the mean term
    pub(crate) trend: Trend,
    /// Covariance model of the correlation term
    pub(crate) corr: Corr,
    /// Tuning of the theta hyperparameters
    pub(crate) theta_tuning: ThetaTuning<F>,
    /// Regularization term added to the correlation matrix diagonal
    pub(crate) nugget: F,
    /// Whether the nugget is grown tenfold on Cholesky failure
    pub(crate) auto_nugget: bool,
    /// Whether the Cholesky factor of the correlation matrix is kept
    /// in the fitted model, enabling variance prediction and sampling
    pub(crate) store_cholesky: bool,
    /// Number of starting points for the multistart optimization
    pub(crate) n_start: usize,
    /// Maximum number of likelihood evaluations per optimization run
    pub(crate) max_eval: usize,
}

impl<F: Float> Default for GprValidParams<F, ConstantTrend, SquaredExponentialCorr> {
    fn default() -> GprValidParams<F, ConstantTrend, SquaredExponentialCorr> {
        GprValidParams {
            trend: ConstantTrend(),
            corr: SquaredExponentialCorr(),
            theta_tuning: ThetaTuning::default(),
            nugget: F::cast(100.) * F::epsilon(),
            auto_nugget: false,
            store_cholesky: true,
            n_start: 10,
            max_eval: 1000,
        }
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> GprValidParams<F, Trend, Corr> {
    /// Get the trend model
    pub fn trend(&self) -> &Trend {
        &self.trend
    }

    /// Get the covariance model
    pub fn corr(&self) -> &Corr {
        &self.corr
    }

    /// Get the theta hyperparameters tuning
    pub fn theta_tuning(&self) -> &ThetaTuning<F> {
        &self.theta_tuning
    }

    /// Get the nugget value
    pub fn nugget(&self) -> F {
        self.nugget
    }

    /// Whether the nugget is automatically grown on factorization failure
    pub fn auto_nugget(&self) -> bool {
        self.auto_nugget
    }

    /// Whether the Cholesky factor is stored in the fitted model
    pub fn store_cholesky(&self) -> bool {
        self.store_cholesky
    }

    /// Get the number of starting points of the multistart optimization
    pub fn n_start(&self) -> usize {
        self.n_start
    }

    /// Get the maximum number of likelihood evaluations
    pub fn max_eval(&self) -> usize {
        self.max_eval
    }
}

/// Gaussian process regression parameters to be validated by
/// [`ParamGuard::check`] before fitting.
#[derive(Clone, Debug)]
pub struct GprParams<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>>(
    pub(crate) GprValidParams<F, Trend, Corr>,
);

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> GprParams<F, Trend, Corr> {
    /// Constructor given trend and covariance models
    pub fn new(trend: Trend, corr: Corr) -> GprParams<F, Trend, Corr> {
        GprParams(GprValidParams {
            trend,
            corr,
            theta_tuning: ThetaTuning::default(),
            nugget: F::cast(100.) * F::epsilon(),
            auto_nugget: false,
            store_cholesky: true,
            n_start: 10,
            max_eval: 1000,
        })
    }

    /// Set the trend model
    pub fn trend(mut self, trend: Trend) -> Self {
        self.0.trend = trend;
        self
    }

    /// Set the covariance model
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }

    /// Set the theta hyperparameters tuning
    pub fn theta_tuning(mut self, theta_tuning: ThetaTuning<F>) -> Self {
        self.0.theta_tuning = theta_tuning;
        self
    }

    /// Set the nugget used to improve numerical stability
    pub fn nugget(mut self, nugget: F) -> Self {
        self.0.nugget = nugget;
        self
    }

    /// Allow the nugget to grow tenfold when the correlation matrix
    /// cannot be factorized
    pub fn auto_nugget(mut self, auto_nugget: bool) -> Self {
        self.0.auto_nugget = auto_nugget;
        self
    }

    /// Keep (or discard) the Cholesky factor of the correlation matrix in
    /// the fitted model. Discarding it makes the model lighter but disables
    /// variance prediction and conditional sampling.
    pub fn store_cholesky(mut self, store_cholesky: bool) -> Self {
        self.0.store_cholesky = store_cholesky;
        self
    }

    /// Set the number of starting points of the multistart optimization
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }

    /// Set the maximum number of likelihood evaluations
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.0.max_eval = max_eval;
        self
    }
}

impl<F: Float, Trend: TrendModel<F>, Corr: CovarianceModel<F>> ParamGuard
    for GprParams<F, Trend, Corr>
{
    type Checked = GprValidParams<F, Trend, Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked, GpError> {
        if self.0.nugget < F::zero() {
            return Err(GpError::InvalidValueError(
                "nugget must be non negative".to_string(),
            ));
        }
        match &self.0.theta_tuning {
            ThetaTuning::Fixed(init) => {
                if init.iter().any(|&v| v <= F::zero()) {
                    return Err(GpError::InvalidValueError(
                        "theta values must be positive".to_string(),
                    ));
                }
            }
            ThetaTuning::Optimized { init, bounds } => {
                if init.iter().any(|&v| v <= F::zero()) {
                    return Err(GpError::InvalidValueError(
                        "theta init values must be positive".to_string(),
                    ));
                }
                if bounds.iter().any(|&(lo, up)| lo <= F::zero() || lo >= up) {
                    return Err(GpError::InvalidValueError(
                        "theta bounds must be positive increasing intervals".to_string(),
                    ));
                }
            }
        }
        if self.0.n_start == 0 {
            return Err(GpError::InvalidValueError(
                "n_start must be at least 1".to_string(),
            ));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, GpError> {
        self.check_ref()?;
        Ok(self.0)
    }
}
