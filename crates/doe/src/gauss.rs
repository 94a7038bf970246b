//! Gauss quadrature rules computed with the Golub-Welsch algorithm:
//! nodes are the eigenvalues of the Jacobi matrix of the orthonormal
//! recurrence, weights come from the first component of the eigenvectors.
//!
//! Weights are normalized against the probability measure of the rule
//! (uniform on \[-1, 1\] for Gauss-Legendre, standard normal for
//! Gauss-Hermite), so they always sum to one.

use linfa::Float;
use linfa_linalg::eigh::EighInto;
use ndarray::{Array1, Array2};

/// Nodes and weights of the `n` point Gauss-Legendre rule on `[-1, 1]`
/// against the uniform probability measure.
///
/// The rule integrates polynomials up to degree `2n - 1` exactly.
///
/// **Panics** if `n` is zero.
pub fn gauss_legendre<F: Float>(n: usize) -> (Array1<F>, Array1<F>) {
    let offdiag: Vec<F> = (1..n)
        .map(|k| {
            let k = k as f64;
            F::cast(k / (4. * k * k - 1.).sqrt())
        })
        .collect();
    golub_welsch(n, &offdiag)
}

/// Nodes and weights of the `n` point Gauss-Hermite rule against the
/// standard normal probability measure.
///
/// The rule integrates polynomials up to degree `2n - 1` exactly.
///
/// **Panics** if `n` is zero.
pub fn gauss_hermite<F: Float>(n: usize) -> (Array1<F>, Array1<F>) {
    let offdiag: Vec<F> = (1..n).map(|k| F::cast((k as f64).sqrt())).collect();
    golub_welsch(n, &offdiag)
}

/// Solve the symmetric tridiagonal eigenproblem of the Jacobi matrix with
/// zero diagonal and the given off-diagonal, and return (nodes, weights)
/// sorted by increasing node.
fn golub_welsch<F: Float>(n: usize, offdiag: &[F]) -> (Array1<F>, Array1<F>) {
    if n == 0 {
        panic!("a quadrature rule needs at least one node");
    }
    let mut jacobi = Array2::<F>::zeros((n, n));
    for (k, &b) in offdiag.iter().enumerate() {
        jacobi[[k, k + 1]] = b;
        jacobi[[k + 1, k]] = b;
    }
    let (values, vectors) = jacobi.eigh_into().unwrap();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());

    let mut nodes = Array1::zeros(n);
    let mut weights = Array1::zeros(n);
    for (i, &k) in order.iter().enumerate() {
        nodes[i] = values[k];
        let v0 = vectors[[0, k]];
        weights[i] = v0 * v0;
    }
    (nodes, weights)
}

/// Tensorized Gauss rule over several dimensions, each with its own
/// one-dimensional rule.
#[derive(Clone, Debug)]
pub struct GaussProduct<F: Float> {
    rules: Vec<(Array1<F>, Array1<F>)>,
}

impl<F: Float> GaussProduct<F> {
    /// Build a product rule from one-dimensional (nodes, weights) rules
    pub fn new(rules: Vec<(Array1<F>, Array1<F>)>) -> Self {
        GaussProduct { rules }
    }

    /// Total number of nodes of the product rule
    pub fn len(&self) -> usize {
        self.rules.iter().map(|(n, _)| n.len()).product()
    }

    /// Whether the product rule has no node
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() || self.len() == 0
    }

    /// Nodes as a (len, nx) matrix and the matching weights, weights of a
    /// node being the product of the one-dimensional weights
    pub fn nodes_weights(&self) -> (Array2<F>, Array1<F>) {
        let nx = self.rules.len();
        let total = self.len();
        let mut nodes = Array2::zeros((total, nx));
        let mut weights = Array1::from_elem(total, F::one());
        let mut block = total;
        for (j, (n1d, w1d)) in self.rules.iter().enumerate() {
            let n = n1d.len();
            block /= n;
            for row in 0..total {
                let level = (row / block) % n;
                nodes[[row, j]] = n1d[level];
                weights[row] = weights[row] * w1d[level];
            }
        }
        (nodes, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gauss_legendre_low_order() {
        let (nodes, weights) = gauss_legendre::<f64>(2);
        // two-point rule sits at -+ 1/sqrt(3) with equal weights
        assert_abs_diff_eq!(nodes[0], -1. / 3_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(nodes[1], 1. / 3_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(weights[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(weights[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_gauss_legendre_moments() {
        let (nodes, weights) = gauss_legendre::<f64>(8);
        assert_abs_diff_eq!(weights.sum(), 1., epsilon = 1e-12);
        // E[x^2] = 1/3 and E[x^4] = 1/5 for the uniform measure on [-1, 1]
        let m2: f64 = nodes.iter().zip(weights.iter()).map(|(&x, &w)| w * x * x).sum();
        let m4: f64 = nodes
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * x.powi(4))
            .sum();
        assert_abs_diff_eq!(m2, 1. / 3., epsilon = 1e-10);
        assert_abs_diff_eq!(m4, 1. / 5., epsilon = 1e-10);
    }

    #[test]
    fn test_gauss_hermite_moments() {
        let (nodes, weights) = gauss_hermite::<f64>(8);
        assert_abs_diff_eq!(weights.sum(), 1., epsilon = 1e-12);
        // standard normal moments: E[x^2] = 1, E[x^4] = 3, odd ones vanish
        let m1: f64 = nodes.iter().zip(weights.iter()).map(|(&x, &w)| w * x).sum();
        let m2: f64 = nodes.iter().zip(weights.iter()).map(|(&x, &w)| w * x * x).sum();
        let m4: f64 = nodes
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * x.powi(4))
            .sum();
        assert_abs_diff_eq!(m1, 0., epsilon = 1e-10);
        assert_abs_diff_eq!(m2, 1., epsilon = 1e-10);
        assert_abs_diff_eq!(m4, 3., epsilon = 1e-9);
    }

    #[test]
    fn test_gauss_product() {
        let product = GaussProduct::new(vec![gauss_legendre::<f64>(3), gauss_legendre::<f64>(2)]);
        assert_eq!(product.len(), 6);
        let (nodes, weights) = product.nodes_weights();
        assert_eq!(nodes.dim(), (6, 2));
        assert_abs_diff_eq!(weights.sum(), 1., epsilon = 1e-12);
        // E[x^2 * y^2] factorizes over the product measure
        let m: f64 = (0..6)
            .map(|i| weights[i] * nodes[[i, 0]].powi(2) * nodes[[i, 1]].powi(2))
            .sum();
        assert_abs_diff_eq!(m, 1. / 9., epsilon = 1e-10);
    }
}
