//! Input distributions: continuous marginals tied together by a copula.

use crate::errors::{ChaosError, Result};
use crate::polynomials::PolynomialFamily;
use libm::erf;
use linfa_linalg::cholesky::Cholesky;
use ndarray::Array2;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, StandardNormal, Uniform};

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function
pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * (1. + erf(x / SQRT_2))
}

/// Standard normal quantile function, Acklam's rational approximation
/// (absolute error below 1.2e-9 over the open unit interval).
pub(crate) fn norm_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    // keep the result finite at the boundaries
    let p = p.clamp(f64::MIN_POSITIVE, 1. - f64::EPSILON);

    if p < P_LOW {
        let q = (-2. * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.)
    } else if p <= 1. - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.)
    } else {
        let q = (-2. * (1. - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.)
    }
}

/// A continuous one-dimensional marginal distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Marginal {
    /// Uniform distribution on `[a, b]`
    Uniform {
        /// Lower bound
        a: f64,
        /// Upper bound
        b: f64,
    },
    /// Normal distribution with mean `mu` and standard deviation `sigma`
    Normal {
        /// Mean
        mu: f64,
        /// Standard deviation
        sigma: f64,
    },
}

impl Marginal {
    /// Uniform marginal on `[a, b]`
    pub fn uniform(a: f64, b: f64) -> Result<Marginal> {
        if a >= b {
            return Err(ChaosError::InvalidArgumentError(format!(
                "uniform bounds must be increasing, got [{a}, {b}]"
            )));
        }
        Ok(Marginal::Uniform { a, b })
    }

    /// Normal marginal with the given mean and standard deviation
    pub fn normal(mu: f64, sigma: f64) -> Result<Marginal> {
        if sigma <= 0. {
            return Err(ChaosError::InvalidArgumentError(format!(
                "normal standard deviation must be positive, got {sigma}"
            )));
        }
        Ok(Marginal::Normal { mu, sigma })
    }

    /// Mean of the marginal
    pub fn mean(&self) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => 0.5 * (a + b),
            Marginal::Normal { mu, .. } => mu,
        }
    }

    /// Standard deviation of the marginal
    pub fn std_dev(&self) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => (b - a) / 12_f64.sqrt(),
            Marginal::Normal { sigma, .. } => sigma,
        }
    }

    /// Probability density function
    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => {
                if x < a || x > b {
                    0.
                } else {
                    1. / (b - a)
                }
            }
            Marginal::Normal { mu, sigma } => {
                let z = (x - mu) / sigma;
                (-0.5 * z * z).exp() / (sigma * (2. * std::f64::consts::PI).sqrt())
            }
        }
    }

    /// Cumulative distribution function
    pub fn cdf(&self, x: f64) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => ((x - a) / (b - a)).clamp(0., 1.),
            Marginal::Normal { mu, sigma } => norm_cdf((x - mu) / sigma),
        }
    }

    /// Quantile function, the inverse of [`Marginal::cdf`]
    pub fn inverse_cdf(&self, p: f64) -> f64 {
        let p = p.clamp(0., 1.);
        match *self {
            Marginal::Uniform { a, b } => a + p * (b - a),
            Marginal::Normal { mu, sigma } => mu + sigma * norm_quantile(p),
        }
    }

    /// Numerical range of the marginal, the exact support for the uniform
    /// and the quantile-clamped one for the normal
    pub fn range(&self) -> (f64, f64) {
        match *self {
            Marginal::Uniform { a, b } => (a, b),
            Marginal::Normal { .. } => (self.inverse_cdf(0.), self.inverse_cdf(1.)),
        }
    }

    /// The orthonormal polynomial family matching the standardized marginal
    pub fn family(&self) -> PolynomialFamily {
        match self {
            Marginal::Uniform { .. } => PolynomialFamily::Legendre,
            Marginal::Normal { .. } => PolynomialFamily::Hermite,
        }
    }

    /// Map a value to the standard representative of the family
    /// (`Uniform(-1, 1)` or `Normal(0, 1)`)
    pub fn to_standard(&self, x: f64) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => 2. * (x - a) / (b - a) - 1.,
            Marginal::Normal { mu, sigma } => (x - mu) / sigma,
        }
    }

    /// Map a standard value back to the marginal, inverse of
    /// [`Marginal::to_standard`]
    pub fn from_standard(&self, u: f64) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => a + 0.5 * (u + 1.) * (b - a),
            Marginal::Normal { mu, sigma } => mu + sigma * u,
        }
    }

    /// Draw one value
    pub fn sample_with_rng(&self, rng: &mut impl Rng) -> f64 {
        match *self {
            Marginal::Uniform { a, b } => Uniform::new(a, b).sample(rng),
            Marginal::Normal { mu, sigma } => {
                let z: f64 = StandardNormal.sample(rng);
                mu + sigma * z
            }
        }
    }
}

/// Dependence structure between the marginals.
#[derive(Clone, Debug)]
pub enum Copula {
    /// Independent components
    Independent,
    /// Normal copula given its correlation matrix
    Gaussian(Array2<f64>),
}

/// A multivariate distribution given by its marginals and a copula.
#[derive(Clone, Debug)]
pub struct JointDistribution {
    marginals: Vec<Marginal>,
    copula: Copula,
}

impl JointDistribution {
    /// Constructor given marginals and a copula
    pub fn new(marginals: Vec<Marginal>, copula: Copula) -> Result<JointDistribution> {
        if marginals.is_empty() {
            return Err(ChaosError::InvalidArgumentError(
                "a distribution needs at least one marginal".to_string(),
            ));
        }
        if let Copula::Gaussian(r) = &copula {
            let d = marginals.len();
            if r.dim() != (d, d) {
                return Err(ChaosError::InvalidArgumentError(format!(
                    "correlation matrix is {:?}, expected ({d}, {d})",
                    r.dim()
                )));
            }
            for i in 0..d {
                if (r[[i, i]] - 1.).abs() > 1e-12 {
                    return Err(ChaosError::InvalidArgumentError(
                        "correlation matrix must have a unit diagonal".to_string(),
                    ));
                }
                for j in 0..i {
                    if (r[[i, j]] - r[[j, i]]).abs() > 1e-12 {
                        return Err(ChaosError::InvalidArgumentError(
                            "correlation matrix must be symmetric".to_string(),
                        ));
                    }
                }
            }
        }
        Ok(JointDistribution { marginals, copula })
    }

    /// Constructor with independent components
    pub fn independent(marginals: Vec<Marginal>) -> Result<JointDistribution> {
        JointDistribution::new(marginals, Copula::Independent)
    }

    /// Number of components
    pub fn dimension(&self) -> usize {
        self.marginals.len()
    }

    /// The marginal distributions
    pub fn marginals(&self) -> &[Marginal] {
        &self.marginals
    }

    /// The copula
    pub fn copula(&self) -> &Copula {
        &self.copula
    }

    /// Whether the components are independent (independent copula, or a
    /// normal copula with identity correlation)
    pub fn has_independent_copula(&self) -> bool {
        match &self.copula {
            Copula::Independent => true,
            Copula::Gaussian(r) => {
                let eye = Array2::<f64>::eye(r.nrows());
                r.iter().zip(eye.iter()).all(|(a, b)| (a - b).abs() < 1e-12)
            }
        }
    }

    /// Joint probability density function at the given point
    pub fn pdf(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "point has {} components, expected {}",
                x.len(),
                self.dimension()
            )));
        }
        let marginal_pdf: f64 = self
            .marginals
            .iter()
            .zip(x)
            .map(|(m, &xi)| m.pdf(xi))
            .product();
        match &self.copula {
            Copula::Independent => Ok(marginal_pdf),
            Copula::Gaussian(r) => {
                if marginal_pdf == 0. {
                    return Ok(0.);
                }
                let z: Vec<f64> = self
                    .marginals
                    .iter()
                    .zip(x)
                    .map(|(m, &xi)| norm_quantile(m.cdf(xi)))
                    .collect();
                let l = r.cholesky()?;
                let det_sqrt: f64 = l.diag().iter().product();
                // w = R^-1 z through the two triangular solves
                let mut w = z.clone();
                for i in 0..w.len() {
                    for j in 0..i {
                        w[i] -= l[[i, j]] * w[j];
                    }
                    w[i] /= l[[i, i]];
                }
                for i in (0..w.len()).rev() {
                    for j in (i + 1)..w.len() {
                        w[i] -= l[[j, i]] * w[j];
                    }
                    w[i] /= l[[i, i]];
                }
                let quad: f64 = z.iter().zip(&w).map(|(zi, wi)| zi * wi).sum::<f64>()
                    - z.iter().map(|zi| zi * zi).sum::<f64>();
                Ok(marginal_pdf * (-0.5 * quad).exp() / det_sqrt)
            }
        }
    }

    /// Draw a `(n, nx)` sample
    pub fn sample_with_rng(&self, n: usize, rng: &mut impl Rng) -> Result<Array2<f64>> {
        let d = self.dimension();
        let mut out = Array2::zeros((n, d));
        match &self.copula {
            Copula::Independent => {
                for mut row in out.rows_mut() {
                    for (j, marginal) in self.marginals.iter().enumerate() {
                        row[j] = marginal.sample_with_rng(rng);
                    }
                }
            }
            Copula::Gaussian(r) => {
                let l = r.cholesky()?;
                for mut row in out.rows_mut() {
                    let z: Vec<f64> = (0..d).map(|_| StandardNormal.sample(rng)).collect();
                    for (j, marginal) in self.marginals.iter().enumerate() {
                        let zc: f64 = (0..=j).map(|k| l[[j, k]] * z[k]).sum();
                        row[j] = marginal.inverse_cdf(norm_cdf(zc));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Componentwise means
    pub fn mean(&self) -> Vec<f64> {
        self.marginals.iter().map(|m| m.mean()).collect()
    }

    /// Componentwise standard deviations
    pub fn std_dev(&self) -> Vec<f64> {
        self.marginals.iter().map(|m| m.std_dev()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_norm_quantile_known_values() {
        assert_abs_diff_eq!(norm_quantile(0.5), 0., epsilon = 1e-9);
        assert_abs_diff_eq!(norm_quantile(0.975), 1.959963985, epsilon = 1e-6);
        assert_abs_diff_eq!(norm_quantile(0.025), -1.959963985, epsilon = 1e-6);
        assert_abs_diff_eq!(norm_quantile(0.001), -3.090232306, epsilon = 1e-6);
    }

    #[test]
    fn test_norm_cdf_quantile_roundtrip() {
        for &x in &[-3., -1.2, 0., 0.7, 2.5] {
            assert_abs_diff_eq!(norm_quantile(norm_cdf(x)), x, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_uniform_marginal() {
        let m = Marginal::uniform(-3., 3.).unwrap();
        assert_abs_diff_eq!(m.mean(), 0.);
        assert_abs_diff_eq!(m.cdf(0.), 0.5);
        assert_abs_diff_eq!(m.inverse_cdf(0.25), -1.5);
        assert_abs_diff_eq!(m.to_standard(3.), 1.);
        assert_abs_diff_eq!(m.from_standard(m.to_standard(1.3)), 1.3, epsilon = 1e-14);
        assert!(Marginal::uniform(1., 1.).is_err());
    }

    #[test]
    fn test_normal_marginal() {
        let m = Marginal::normal(2., 0.5).unwrap();
        assert_abs_diff_eq!(m.cdf(2.), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m.inverse_cdf(m.cdf(2.7)), 2.7, epsilon = 1e-7);
        assert_abs_diff_eq!(m.pdf(2.), 1. / (0.5 * (2. * std::f64::consts::PI).sqrt()));
        let (lo, hi) = m.range();
        assert!(lo.is_finite() && hi.is_finite() && lo < 2. && hi > 2.);
        assert!(Marginal::normal(0., 0.).is_err());
    }

    #[test]
    fn test_independent_sampling_bounds() {
        let dist = JointDistribution::independent(vec![
            Marginal::uniform(0., 1.).unwrap(),
            Marginal::normal(0., 1.).unwrap(),
        ])
        .unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let sample = dist.sample_with_rng(200, &mut rng).unwrap();
        assert_eq!(sample.dim(), (200, 2));
        assert!(sample.column(0).iter().all(|&v| (0. ..=1.).contains(&v)));
    }

    #[test]
    fn test_gaussian_copula_correlation() {
        let r = array![[1., 0.8], [0.8, 1.]];
        let dist = JointDistribution::new(
            vec![
                Marginal::normal(0., 1.).unwrap(),
                Marginal::normal(0., 1.).unwrap(),
            ],
            Copula::Gaussian(r),
        )
        .unwrap();
        assert!(!dist.has_independent_copula());
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let sample = dist.sample_with_rng(2000, &mut rng).unwrap();
        let c0 = sample.column(0).to_owned();
        let c1 = sample.column(1).to_owned();
        let m0 = c0.mean().unwrap();
        let m1 = c1.mean().unwrap();
        let cov = c0
            .iter()
            .zip(c1.iter())
            .map(|(&a, &b)| (a - m0) * (b - m1))
            .sum::<f64>()
            / 2000.;
        assert!(cov > 0.6, "empirical covariance {cov} too far from 0.8");
    }

    #[test]
    fn test_gaussian_copula_identity_is_independent() {
        let dist = JointDistribution::new(
            vec![
                Marginal::uniform(0., 1.).unwrap(),
                Marginal::uniform(0., 1.).unwrap(),
            ],
            Copula::Gaussian(Array2::eye(2)),
        )
        .unwrap();
        assert!(dist.has_independent_copula());
    }

    #[test]
    fn test_independent_pdf_product() {
        let dist = JointDistribution::independent(vec![
            Marginal::uniform(0., 2.).unwrap(),
            Marginal::normal(0., 1.).unwrap(),
        ])
        .unwrap();
        let p = dist.pdf(&[1., 0.]).unwrap();
        assert_abs_diff_eq!(
            p,
            0.5 / (2. * std::f64::consts::PI).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_correlation_rejected() {
        let r = array![[1., 0.5], [0.4, 1.]];
        let res = JointDistribution::new(
            vec![
                Marginal::normal(0., 1.).unwrap(),
                Marginal::normal(0., 1.).unwrap(),
            ],
            Copula::Gaussian(r),
        );
        assert!(res.is_err());
    }
}
