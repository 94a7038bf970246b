//! Enumeration of multi-indices: bijections between a linear index and the
//! multi-degree `alpha` of a tensorized polynomial basis term.
//!
//! All enumerations are graded: the total (or quasi-norm) degree of the terms
//! never decreases along the sequence, so truncating the first `p` terms
//! always yields a meaningful basis.

use crate::errors::{ChaosError, Result};
use std::cmp::Ordering;

/// A bijection between linear indices and multi-indices.
pub trait EnumerateFunction: Clone + Send + Sync {
    /// Number of components of the multi-indices
    fn dimension(&self) -> usize;

    /// Multi-index of the term at the given linear index
    fn multi_index(&self, index: usize) -> Result<Vec<usize>>;

    /// Linear index of the given multi-index
    fn linear_index(&self, alpha: &[usize]) -> Result<usize>;

    /// Number of terms of degree (or quasi-norm) at most `degree`
    fn strata_cumulated_cardinal(&self, degree: usize) -> usize;
}

/// Exact binomial coefficient, computed with interleaved division so every
/// intermediate value is itself a binomial coefficient.
fn binomial(n: usize, k: usize) -> usize {
    let k = k.min(n - k);
    let mut res = 1usize;
    for i in 1..=k {
        res = res * (n - k + i) / i;
    }
    res
}

/// All multi-indices of `dim` components with total degree exactly `degree`,
/// first component decreasing first.
fn stratum(dim: usize, degree: usize) -> Vec<Vec<usize>> {
    if dim == 1 {
        return vec![vec![degree]];
    }
    let mut out = Vec::with_capacity(binomial(degree + dim - 1, dim - 1));
    for first in (0..=degree).rev() {
        for mut rest in stratum(dim - 1, degree - first) {
            let mut alpha = Vec::with_capacity(dim);
            alpha.push(first);
            alpha.append(&mut rest);
            out.push(alpha);
        }
    }
    out
}

/// Graded enumeration by increasing total degree, ties broken by
/// decreasing first components: in two dimensions
/// `[0,0], [1,0], [0,1], [2,0], [1,1], [0,2], ...`
#[derive(Clone, Debug)]
pub struct LinearEnumerateFunction {
    dim: usize,
}

impl LinearEnumerateFunction {
    /// Constructor given the number of components
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ChaosError::InvalidArgumentError(
                "enumeration dimension must be at least 1".to_string(),
            ));
        }
        Ok(LinearEnumerateFunction { dim })
    }
}

impl EnumerateFunction for LinearEnumerateFunction {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn multi_index(&self, index: usize) -> Result<Vec<usize>> {
        let mut degree = 0;
        let mut offset = 0;
        loop {
            let card = binomial(degree + self.dim - 1, self.dim - 1);
            if index < offset + card {
                return Ok(stratum(self.dim, degree).swap_remove(index - offset));
            }
            offset += card;
            degree += 1;
        }
    }

    fn linear_index(&self, alpha: &[usize]) -> Result<usize> {
        if alpha.len() != self.dim {
            return Err(ChaosError::InvalidArgumentError(format!(
                "multi-index has {} components, expected {}",
                alpha.len(),
                self.dim
            )));
        }
        let degree: usize = alpha.iter().sum();
        let offset = if degree == 0 {
            0
        } else {
            self.strata_cumulated_cardinal(degree - 1)
        };
        let pos = stratum(self.dim, degree)
            .iter()
            .position(|a| a == alpha)
            .unwrap();
        Ok(offset + pos)
    }

    fn strata_cumulated_cardinal(&self, degree: usize) -> usize {
        binomial(degree + self.dim, self.dim)
    }
}

/// Graded enumeration by increasing anisotropic quasi-norm
/// `(sum_j alpha_j^q)^(1/q)` with `0 < q <= 1`.
///
/// The smaller `q`, the later the interaction terms appear in the sequence,
/// which favors sparse additive expansions. With `q = 1` this reduces to
/// [`LinearEnumerateFunction`].
#[derive(Clone, Debug)]
pub struct HyperbolicEnumerateFunction {
    dim: usize,
    q: f64,
}

/// Tolerance when comparing quasi-norm values of different multi-indices
const QNORM_EPS: f64 = 1e-10;

impl HyperbolicEnumerateFunction {
    /// Constructor given the number of components and the quasi-norm
    /// parameter `q` in `(0, 1]`
    pub fn new(dim: usize, q: f64) -> Result<Self> {
        if dim == 0 {
            return Err(ChaosError::InvalidArgumentError(
                "enumeration dimension must be at least 1".to_string(),
            ));
        }
        if !(q > 0. && q <= 1.) {
            return Err(ChaosError::InvalidArgumentError(format!(
                "hyperbolic quasi-norm parameter must lie in (0, 1], got {q}"
            )));
        }
        Ok(HyperbolicEnumerateFunction { dim, q })
    }

    fn qnorm(&self, alpha: &[usize]) -> f64 {
        alpha
            .iter()
            .map(|&a| (a as f64).powf(self.q))
            .sum::<f64>()
            .powf(1. / self.q)
    }

    fn cmp_alpha(&self, a: &[usize], b: &[usize]) -> Ordering {
        let (qa, qb) = (self.qnorm(a), self.qnorm(b));
        if (qa - qb).abs() > QNORM_EPS {
            return qa.partial_cmp(&qb).unwrap();
        }
        let (sa, sb) = (a.iter().sum::<usize>(), b.iter().sum::<usize>());
        if sa != sb {
            return sa.cmp(&sb);
        }
        b.cmp(a)
    }

    /// All multi-indices with quasi-norm at most `bound`, globally sorted.
    ///
    /// Since `q <= 1` the quasi-norm dominates the total degree, so
    /// generating the strata up to total degree `bound` is exhaustive.
    fn sorted_up_to(&self, bound: usize) -> Vec<Vec<usize>> {
        let mut items: Vec<Vec<usize>> = (0..=bound)
            .flat_map(|d| stratum(self.dim, d))
            .filter(|a| self.qnorm(a) <= bound as f64 + QNORM_EPS)
            .collect();
        items.sort_by(|a, b| self.cmp_alpha(a, b));
        items
    }
}

impl EnumerateFunction for HyperbolicEnumerateFunction {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn multi_index(&self, index: usize) -> Result<Vec<usize>> {
        let mut bound = 1;
        loop {
            let mut items = self.sorted_up_to(bound);
            if items.len() > index {
                return Ok(items.swap_remove(index));
            }
            bound += 1;
        }
    }

    fn linear_index(&self, alpha: &[usize]) -> Result<usize> {
        if alpha.len() != self.dim {
            return Err(ChaosError::InvalidArgumentError(format!(
                "multi-index has {} components, expected {}",
                alpha.len(),
                self.dim
            )));
        }
        let bound = self.qnorm(alpha).ceil() as usize;
        let items = self.sorted_up_to(bound);
        Ok(items.iter().position(|a| a == alpha).unwrap())
    }

    fn strata_cumulated_cardinal(&self, degree: usize) -> usize {
        self.sorted_up_to(degree).len()
    }
}

/// Restriction of an enumeration to the multi-indices whose components stay
/// within per-component bounds, renumbered without holes.
///
/// The resulting domain is finite with `prod_j (bound_j + 1)` terms;
/// requests beyond it fail with a configuration error.
#[derive(Clone, Debug)]
pub struct BoundedEnumerateFunction<E: EnumerateFunction> {
    inner: E,
    bounds: Vec<usize>,
}

impl<E: EnumerateFunction> BoundedEnumerateFunction<E> {
    /// Constructor given the enumeration to restrict and the inclusive
    /// per-component degree bounds
    pub fn new(inner: E, bounds: &[usize]) -> Result<Self> {
        if bounds.len() != inner.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "{} bounds given, expected one per component ({})",
                bounds.len(),
                inner.dimension()
            )));
        }
        Ok(BoundedEnumerateFunction {
            inner,
            bounds: bounds.to_vec(),
        })
    }

    /// Total number of multi-indices within the bounds
    pub fn size(&self) -> usize {
        self.bounds.iter().map(|&b| b + 1).product()
    }

    fn contains(&self, alpha: &[usize]) -> bool {
        alpha.iter().zip(&self.bounds).all(|(&a, &b)| a <= b)
    }

    /// Every retained multi-index has total degree at most the sum of the
    /// bounds, hence appears in the inner sequence before this position.
    fn scan_cap(&self) -> usize {
        self.inner
            .strata_cumulated_cardinal(self.bounds.iter().sum())
    }
}

impl<E: EnumerateFunction> EnumerateFunction for BoundedEnumerateFunction<E> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn multi_index(&self, index: usize) -> Result<Vec<usize>> {
        if index >= self.size() {
            return Err(ChaosError::ConfigurationError(format!(
                "index {} out of the bounded domain of size {}",
                index,
                self.size()
            )));
        }
        let mut count = 0;
        for j in 0..self.scan_cap() {
            let alpha = self.inner.multi_index(j)?;
            if self.contains(&alpha) {
                if count == index {
                    return Ok(alpha);
                }
                count += 1;
            }
        }
        Err(ChaosError::ConfigurationError(format!(
            "index {index} not reachable within the bounded domain"
        )))
    }

    fn linear_index(&self, alpha: &[usize]) -> Result<usize> {
        if !self.contains(alpha) {
            return Err(ChaosError::ConfigurationError(format!(
                "multi-index {alpha:?} violates the bounds {:?}",
                self.bounds
            )));
        }
        let inner_index = self.inner.linear_index(alpha)?;
        let mut count = 0;
        for j in 0..inner_index {
            if self.contains(&self.inner.multi_index(j)?) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn strata_cumulated_cardinal(&self, degree: usize) -> usize {
        (0..self.inner.strata_cumulated_cardinal(degree))
            .filter(|&j| {
                self.inner
                    .multi_index(j)
                    .map(|a| self.contains(&a))
                    .unwrap_or(false)
            })
            .count()
    }
}
