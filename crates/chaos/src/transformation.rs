//! Iso-probabilistic transformation between the physical input space and
//! the standardized space where the orthonormal basis lives.
//!
//! Independent inputs only need the componentwise affine map to the
//! standard representative of each marginal. A normal copula goes through
//! the normal space: componentwise `z = Phi^-1(F(x))`, then the Cholesky
//! factor of the correlation decorrelates the components, and every
//! standardized marginal becomes standard normal.

use crate::distribution::{norm_cdf, norm_quantile, Copula, JointDistribution};
use crate::errors::Result;
use crate::polynomials::PolynomialFamily;
use linfa_linalg::cholesky::Cholesky;
use ndarray::Array2;

/// Maps samples of a [`JointDistribution`] to independent standardized
/// components and back.
#[derive(Clone, Debug)]
pub struct IsoProbabilisticTransform {
    distribution: JointDistribution,
    // lower Cholesky factor of the copula correlation, None when the
    // components are independent
    chol: Option<Array2<f64>>,
}

impl IsoProbabilisticTransform {
    /// Constructor given the input distribution.
    ///
    /// Fails when the copula correlation is not positive definite.
    pub fn new(distribution: JointDistribution) -> Result<IsoProbabilisticTransform> {
        let chol = if distribution.has_independent_copula() {
            None
        } else {
            match distribution.copula() {
                Copula::Gaussian(r) => Some(r.cholesky()?),
                Copula::Independent => None,
            }
        };
        Ok(IsoProbabilisticTransform { distribution, chol })
    }

    /// The input distribution
    pub fn distribution(&self) -> &JointDistribution {
        &self.distribution
    }

    /// The polynomial families matching the standardized components
    pub fn standard_families(&self) -> Vec<PolynomialFamily> {
        match &self.chol {
            None => self
                .distribution
                .marginals()
                .iter()
                .map(|m| m.family())
                .collect(),
            // decorrelated components are standard normal
            Some(_) => vec![PolynomialFamily::Hermite; self.distribution.dimension()],
        }
    }

    /// Map a `(n, nx)` physical sample to the standardized space
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let marginals = self.distribution.marginals();
        let mut u = Array2::zeros(x.raw_dim());
        match &self.chol {
            None => {
                for (mut urow, xrow) in u.rows_mut().into_iter().zip(x.rows()) {
                    for (j, marginal) in marginals.iter().enumerate() {
                        urow[j] = marginal.to_standard(xrow[j]);
                    }
                }
            }
            Some(l) => {
                let d = marginals.len();
                for (mut urow, xrow) in u.rows_mut().into_iter().zip(x.rows()) {
                    let mut z: Vec<f64> = marginals
                        .iter()
                        .zip(xrow)
                        .map(|(m, &xi)| norm_quantile(m.cdf(xi)))
                        .collect();
                    // forward substitution solves L u = z
                    for i in 0..d {
                        for j in 0..i {
                            z[i] -= l[[i, j]] * z[j];
                        }
                        z[i] /= l[[i, i]];
                        urow[i] = z[i];
                    }
                }
            }
        }
        u
    }

    /// Map a `(n, nx)` standardized sample back to the physical space,
    /// inverse of [`IsoProbabilisticTransform::forward`]
    pub fn inverse(&self, u: &Array2<f64>) -> Array2<f64> {
        let marginals = self.distribution.marginals();
        let mut x = Array2::zeros(u.raw_dim());
        match &self.chol {
            None => {
                for (mut xrow, urow) in x.rows_mut().into_iter().zip(u.rows()) {
                    for (j, marginal) in marginals.iter().enumerate() {
                        xrow[j] = marginal.from_standard(urow[j]);
                    }
                }
            }
            Some(l) => {
                let d = marginals.len();
                for (mut xrow, urow) in x.rows_mut().into_iter().zip(u.rows()) {
                    for i in 0..d {
                        let zi: f64 = (0..=i).map(|k| l[[i, k]] * urow[k]).sum();
                        xrow[i] = marginals[i].inverse_cdf(norm_cdf(zi));
                    }
                }
            }
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Marginal;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_independent_affine_map() {
        let dist = JointDistribution::independent(vec![
            Marginal::uniform(0., 2.).unwrap(),
            Marginal::normal(3., 2.).unwrap(),
        ])
        .unwrap();
        let transform = IsoProbabilisticTransform::new(dist).unwrap();
        assert_eq!(
            transform.standard_families(),
            vec![PolynomialFamily::Legendre, PolynomialFamily::Hermite]
        );
        let x = array![[0., 3.], [2., 5.], [1., 1.]];
        let u = transform.forward(&x);
        assert_abs_diff_eq!(u, array![[-1., 0.], [1., 1.], [0., -1.]], epsilon = 1e-14);
        let back = transform.inverse(&u);
        assert_abs_diff_eq!(back, x, epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_copula_roundtrip() {
        let dist = JointDistribution::new(
            vec![
                Marginal::uniform(-1., 1.).unwrap(),
                Marginal::normal(0., 1.).unwrap(),
            ],
            Copula::Gaussian(array![[1., 0.6], [0.6, 1.]]),
        )
        .unwrap();
        let transform = IsoProbabilisticTransform::new(dist.clone()).unwrap();
        assert_eq!(
            transform.standard_families(),
            vec![PolynomialFamily::Hermite, PolynomialFamily::Hermite]
        );
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let x = dist.sample_with_rng(50, &mut rng).unwrap();
        let u = transform.forward(&x);
        let back = transform.inverse(&u);
        assert_abs_diff_eq!(back, x, epsilon = 1e-6);
    }

    #[test]
    fn test_gaussian_copula_decorrelates() {
        let dist = JointDistribution::new(
            vec![
                Marginal::normal(0., 1.).unwrap(),
                Marginal::normal(0., 1.).unwrap(),
            ],
            Copula::Gaussian(array![[1., 0.9], [0.9, 1.]]),
        )
        .unwrap();
        let transform = IsoProbabilisticTransform::new(dist.clone()).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let x = dist.sample_with_rng(3000, &mut rng).unwrap();
        let u = transform.forward(&x);
        let c0 = u.column(0);
        let c1 = u.column(1);
        let m0 = c0.mean().unwrap();
        let m1 = c1.mean().unwrap();
        let cov = c0
            .iter()
            .zip(c1.iter())
            .map(|(&a, &b)| (a - m0) * (b - m1))
            .sum::<f64>()
            / 3000.;
        assert!(cov.abs() < 0.1, "standardized covariance {cov} not near 0");
    }
}
