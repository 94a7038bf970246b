//! Multivariate functional bases indexed by an enumeration of multi-indices.
//!
//! With independent standardized components the basis tensorizes the
//! univariate orthonormal families and is orthonormal by construction.
//! Otherwise [`GramSchmidtBasis`] orthonormalizes the monomials against an
//! empirical measure given by a weighted sample.

use crate::enumerate::EnumerateFunction;
use crate::errors::{ChaosError, Result};
use crate::polynomials::PolynomialFamily;
use log::warn;
use ndarray::{Array1, Array2, ArrayView1};

// relative pivot tolerance below which a candidate is linearly dependent
const GRAM_SCHMIDT_PIVOT_TOL: f64 = 1e-10;
// coefficients this small relative to the largest one are zeroed
const COEFFICIENT_TOL: f64 = 1e-12;

/// Tensor product of univariate orthonormal polynomial families, ordered by
/// an enumeration of multi-indices.
#[derive(Clone, Debug)]
pub struct OrthogonalBasis<E: EnumerateFunction> {
    families: Vec<PolynomialFamily>,
    enumerate: E,
}

impl<E: EnumerateFunction> OrthogonalBasis<E> {
    /// Constructor given one family per component and the enumeration
    pub fn new(families: Vec<PolynomialFamily>, enumerate: E) -> Result<Self> {
        if families.len() != enumerate.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "{} polynomial families given, expected one per component ({})",
                families.len(),
                enumerate.dimension()
            )));
        }
        Ok(OrthogonalBasis {
            families,
            enumerate,
        })
    }

    /// Number of input components
    pub fn dimension(&self) -> usize {
        self.families.len()
    }

    /// The enumeration ordering the terms
    pub fn enumerate(&self) -> &E {
        &self.enumerate
    }

    /// Multi-index of the term at the given position
    pub fn multi_index(&self, term: usize) -> Result<Vec<usize>> {
        self.enumerate.multi_index(term)
    }

    /// Value of one basis term at a standardized point
    pub fn value(&self, term: usize, u: ArrayView1<f64>) -> Result<f64> {
        let alpha = self.enumerate.multi_index(term)?;
        Ok(self
            .families
            .iter()
            .zip(&alpha)
            .zip(u)
            .map(|((family, &degree), &ui)| family.eval(degree, ui))
            .product())
    }

    /// Design matrix `(n, terms.len())` of the given terms at the given
    /// standardized points
    pub fn matrix(&self, terms: &[usize], points: &Array2<f64>) -> Result<Array2<f64>> {
        let mut phi = Array2::zeros((points.nrows(), terms.len()));
        for (k, &term) in terms.iter().enumerate() {
            let alpha = self.enumerate.multi_index(term)?;
            for (i, row) in points.rows().into_iter().enumerate() {
                phi[[i, k]] = self
                    .families
                    .iter()
                    .zip(&alpha)
                    .zip(row)
                    .map(|((family, &degree), &ui)| family.eval(degree, ui))
                    .product();
            }
        }
        Ok(phi)
    }
}

fn monomial(alpha: &[usize], u: ArrayView1<f64>) -> f64 {
    alpha
        .iter()
        .zip(u)
        .map(|(&a, &ui)| ui.powi(a as i32))
        .product()
}

/// Basis orthonormalized by modified Gram-Schmidt against the empirical
/// measure of a weighted sample.
///
/// Candidate monomials are visited in enumeration order; a candidate that is
/// numerically dependent on the span of the previous ones is skipped and the
/// following terms are renumbered, so the retained multi-indices may have
/// holes with respect to the enumeration.
#[derive(Clone, Debug)]
pub struct GramSchmidtBasis<E: EnumerateFunction> {
    enumerate: E,
    // multi-index of the pivot monomial of each retained function
    retained: Vec<Vec<usize>>,
    // coefficients[k][j] multiplies the monomial of candidate j, j <= k-th pivot
    coefficients: Vec<Vec<f64>>,
    // all candidate multi-indices scanned, in enumeration order
    candidates: Vec<Vec<usize>>,
}

impl<E: EnumerateFunction> GramSchmidtBasis<E> {
    /// Orthonormalize the first monomials of the enumeration against the
    /// measure given by `sample` and `weights`, until `size` functions are
    /// retained.
    ///
    /// Weights must be non-negative and sum to one.
    pub fn new(
        enumerate: E,
        sample: &Array2<f64>,
        weights: &Array1<f64>,
        size: usize,
    ) -> Result<Self> {
        if sample.nrows() != weights.len() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "{} weights for a sample of {} points",
                weights.len(),
                sample.nrows()
            )));
        }
        if sample.ncols() != enumerate.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "sample has {} components, enumeration expects {}",
                sample.ncols(),
                enumerate.dimension()
            )));
        }
        if size > sample.nrows() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "cannot orthonormalize {size} functions on {} points",
                sample.nrows()
            )));
        }

        let dot = |a: &Array1<f64>, b: &Array1<f64>| -> f64 {
            a.iter()
                .zip(b)
                .zip(weights)
                .map(|((&ai, &bi), &wi)| wi * ai * bi)
                .sum()
        };

        let mut retained = Vec::with_capacity(size);
        let mut coefficients: Vec<Vec<f64>> = Vec::with_capacity(size);
        let mut values: Vec<Array1<f64>> = Vec::with_capacity(size);
        let mut candidates = Vec::new();

        // candidates far beyond the target size mean the sample cannot
        // resolve the requested basis
        let scan_cap = 10 * size.max(1);
        let mut candidate = 0;
        while retained.len() < size {
            if candidate >= scan_cap {
                return Err(ChaosError::ConfigurationError(format!(
                    "only {} of {size} functions retained after scanning \
                     {scan_cap} candidates",
                    retained.len()
                )));
            }
            let alpha = enumerate.multi_index(candidate)?;
            let mut v = Array1::from_iter(sample.rows().into_iter().map(|row| monomial(&alpha, row)));
            let norm0 = dot(&v, &v).sqrt();
            let mut c = vec![0.; candidate + 1];
            c[candidate] = 1.;
            for (vk, ck) in values.iter().zip(&coefficients) {
                let proj = dot(&v, vk);
                v.zip_mut_with(vk, |vi, &vki| *vi -= proj * vki);
                for (j, &ckj) in ck.iter().enumerate() {
                    c[j] -= proj * ckj;
                }
            }
            let norm = dot(&v, &v).sqrt();
            if norm <= GRAM_SCHMIDT_PIVOT_TOL * norm0.max(1.) {
                warn!("skipping degenerate candidate {alpha:?} in Gram-Schmidt basis");
            } else {
                v.mapv_inplace(|vi| vi / norm);
                let cmax = c.iter().fold(0_f64, |m, &cj| m.max(cj.abs()));
                for cj in c.iter_mut() {
                    *cj /= norm;
                    if cj.abs() < COEFFICIENT_TOL * cmax {
                        *cj = 0.;
                    }
                }
                retained.push(alpha.clone());
                coefficients.push(c);
                values.push(v);
            }
            candidates.push(alpha);
            candidate += 1;
        }

        Ok(GramSchmidtBasis {
            enumerate,
            retained,
            coefficients,
            candidates,
        })
    }

    /// Number of input components
    pub fn dimension(&self) -> usize {
        self.enumerate.dimension()
    }

    /// Number of retained basis functions
    pub fn size(&self) -> usize {
        self.retained.len()
    }

    /// Multi-index of the pivot monomial of the given retained function
    pub fn multi_index(&self, term: usize) -> Result<Vec<usize>> {
        self.retained
            .get(term)
            .cloned()
            .ok_or_else(|| {
                ChaosError::ConfigurationError(format!(
                    "term {term} beyond the {} retained functions",
                    self.retained.len()
                ))
            })
    }

    /// Value of one retained function at a point
    pub fn value(&self, term: usize, u: ArrayView1<f64>) -> Result<f64> {
        let c = self.coefficients.get(term).ok_or_else(|| {
            ChaosError::ConfigurationError(format!(
                "term {term} beyond the {} retained functions",
                self.coefficients.len()
            ))
        })?;
        Ok(c.iter()
            .zip(&self.candidates)
            .filter(|(&cj, _)| cj != 0.)
            .map(|(&cj, alpha)| cj * monomial(alpha, u))
            .sum())
    }

    /// Design matrix `(n, terms.len())` of the given retained functions
    pub fn matrix(&self, terms: &[usize], points: &Array2<f64>) -> Result<Array2<f64>> {
        let mut phi = Array2::zeros((points.nrows(), terms.len()));
        for (k, &term) in terms.iter().enumerate() {
            for (i, row) in points.rows().into_iter().enumerate() {
                phi[[i, k]] = self.value(term, row)?;
            }
        }
        Ok(phi)
    }
}

/// The basis actually used by a chaos expansion, picked from the structure
/// of the input distribution.
#[derive(Clone, Debug)]
pub enum ChaosBasis<E: EnumerateFunction> {
    /// Tensorized orthonormal families, for independent standardized inputs
    Tensor(OrthogonalBasis<E>),
    /// Empirical Gram-Schmidt orthonormalization
    GramSchmidt(GramSchmidtBasis<E>),
}

impl<E: EnumerateFunction> ChaosBasis<E> {
    /// Number of input components
    pub fn dimension(&self) -> usize {
        match self {
            ChaosBasis::Tensor(b) => b.dimension(),
            ChaosBasis::GramSchmidt(b) => b.dimension(),
        }
    }

    /// Multi-index attached to the given term
    pub fn multi_index(&self, term: usize) -> Result<Vec<usize>> {
        match self {
            ChaosBasis::Tensor(b) => b.multi_index(term),
            ChaosBasis::GramSchmidt(b) => b.multi_index(term),
        }
    }

    /// Value of one term at a standardized point
    pub fn value(&self, term: usize, u: ArrayView1<f64>) -> Result<f64> {
        match self {
            ChaosBasis::Tensor(b) => b.value(term, u),
            ChaosBasis::GramSchmidt(b) => b.value(term, u),
        }
    }

    /// Design matrix of the given terms at the given standardized points
    pub fn matrix(&self, terms: &[usize], points: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            ChaosBasis::Tensor(b) => b.matrix(terms, points),
            ChaosBasis::GramSchmidt(b) => b.matrix(terms, points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::LinearEnumerateFunction;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use uqbox_doe::{gauss_legendre, GaussProduct};

    #[test]
    fn test_tensor_basis_values() {
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let basis = OrthogonalBasis::new(
            vec![PolynomialFamily::Legendre, PolynomialFamily::Hermite],
            enumerate,
        )
        .unwrap();
        let u = array![0.5, 1.5];
        // term 4 is [1, 1]: sqrt(3) * u0 * u1
        assert_abs_diff_eq!(
            basis.value(4, u.view()).unwrap(),
            3_f64.sqrt() * 0.5 * 1.5,
            epsilon = 1e-13
        );
        // term 0 is the constant
        assert_abs_diff_eq!(basis.value(0, u.view()).unwrap(), 1.);
    }

    #[test]
    fn test_tensor_matrix_orthonormal_by_quadrature() {
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let basis = OrthogonalBasis::new(
            vec![PolynomialFamily::Legendre, PolynomialFamily::Legendre],
            enumerate,
        )
        .unwrap();
        let product = GaussProduct::new(vec![gauss_legendre::<f64>(8), gauss_legendre::<f64>(8)]);
        let (nodes, weights) = product.nodes_weights();
        let terms: Vec<usize> = (0..6).collect();
        let phi = basis.matrix(&terms, &nodes).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                let dot: f64 = (0..nodes.nrows())
                    .map(|r| weights[r] * phi[[r, i]] * phi[[r, j]])
                    .sum();
                let expected = if i == j { 1. } else { 0. };
                assert_abs_diff_eq!(dot, expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        assert!(OrthogonalBasis::new(vec![PolynomialFamily::Legendre], enumerate).is_err());
    }

    #[test]
    fn test_gram_schmidt_recovers_legendre() {
        // on the exact uniform measure the Gram-Schmidt basis matches the
        // orthonormal Legendre polynomials up to sign
        let (nodes1d, weights) = gauss_legendre::<f64>(16);
        let nodes = nodes1d
            .clone()
            .into_shape((16, 1))
            .unwrap();
        let enumerate = LinearEnumerateFunction::new(1).unwrap();
        let basis = GramSchmidtBasis::new(enumerate, &nodes, &weights, 4).unwrap();
        assert_eq!(basis.size(), 4);
        for &x in &[-0.7, 0., 0.3, 0.9] {
            let u = array![x];
            for degree in 0..4 {
                let reference = PolynomialFamily::Legendre.eval(degree, x);
                let value = basis.value(degree, u.view()).unwrap();
                assert_abs_diff_eq!(value.abs(), reference.abs(), epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_gram_schmidt_orthonormal() {
        let product = GaussProduct::new(vec![gauss_legendre::<f64>(6), gauss_legendre::<f64>(6)]);
        let (nodes, weights) = product.nodes_weights();
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let basis = GramSchmidtBasis::new(enumerate, &nodes, &weights, 6).unwrap();
        let terms: Vec<usize> = (0..6).collect();
        let phi = basis.matrix(&terms, &nodes).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                let dot: f64 = (0..nodes.nrows())
                    .map(|r| weights[r] * phi[[r, i]] * phi[[r, j]])
                    .sum();
                let expected = if i == j { 1. } else { 0. };
                assert_abs_diff_eq!(dot, expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_gram_schmidt_too_many_functions() {
        let env = env_logger::Env::new().filter_or("UQBOX_LOG", "info");
        let mut builder = env_logger::Builder::from_env(env);
        builder.target(env_logger::Target::Stdout).try_init().ok();
        // three quadrature nodes support at most three independent
        // polynomials, the remaining candidates are degenerate
        let (nodes1d, weights) = gauss_legendre::<f64>(3);
        let nodes = nodes1d.into_shape((3, 1)).unwrap();
        let enumerate = LinearEnumerateFunction::new(1).unwrap();
        assert!(GramSchmidtBasis::new(enumerate, &nodes, &weights, 5).is_err());
    }
}
