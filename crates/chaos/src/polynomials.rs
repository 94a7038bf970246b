//! Univariate orthonormal polynomial families, one per standard marginal
//! distribution, evaluated with their three-term recurrences.

use ndarray::Array1;
use uqbox_doe::{gauss_hermite, gauss_legendre};

/// An orthonormal polynomial family associated with a standard measure.
///
/// Families are orthonormal: `E[phi_i(X) * phi_j(X)] = delta_ij` where `X`
/// follows the standard measure of the family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolynomialFamily {
    /// Legendre polynomials, orthonormal against the uniform measure on `[-1, 1]`
    Legendre,
    /// Hermite polynomials, orthonormal against the standard normal measure
    Hermite,
}

impl PolynomialFamily {
    /// Value of the orthonormal polynomial of the given degree at `x`
    pub fn eval(&self, degree: usize, x: f64) -> f64 {
        match self {
            PolynomialFamily::Legendre => {
                // x * phi_n = b_{n+1} * phi_{n+1} + b_n * phi_{n-1}
                // with b_n = n / sqrt((2n - 1) * (2n + 1))
                let b = |n: usize| {
                    let n = n as f64;
                    n / ((2. * n - 1.) * (2. * n + 1.)).sqrt()
                };
                let mut prev = 1.;
                if degree == 0 {
                    return prev;
                }
                let mut cur = 3_f64.sqrt() * x;
                for n in 1..degree {
                    let next = (x * cur - b(n) * prev) / b(n + 1);
                    prev = cur;
                    cur = next;
                }
                cur
            }
            PolynomialFamily::Hermite => {
                // x * phi_n = sqrt(n + 1) * phi_{n+1} + sqrt(n) * phi_{n-1}
                let mut prev = 1.;
                if degree == 0 {
                    return prev;
                }
                let mut cur = x;
                for n in 1..degree {
                    let next = (x * cur - (n as f64).sqrt() * prev) / ((n + 1) as f64).sqrt();
                    prev = cur;
                    cur = next;
                }
                cur
            }
        }
    }

    /// Gauss quadrature rule with `n` nodes against the standard measure
    /// of the family
    pub fn gauss_rule(&self, n: usize) -> (Array1<f64>, Array1<f64>) {
        match self {
            PolynomialFamily::Legendre => gauss_legendre(n),
            PolynomialFamily::Hermite => gauss_hermite(n),
        }
    }
}
