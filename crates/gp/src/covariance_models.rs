//! Stationary covariance models (correlation kernels) parameterized by
//! `theta`, the inverse of the length scale in each dimension.
//!
//! Kernels are evaluated on componentwise differences `d = x - x'` given
//! as a `(n, nx)` matrix, one row per pair of points.

use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use paste::paste;
use std::fmt;

/// A trait for covariance models used by Gaussian process regression.
pub trait CovarianceModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync + Send {
    /// Compute correlation values given componentwise differences `d` between
    /// pairs of points specified as a `(n, nx)` matrix and hyperparameters
    /// `theta` of size `nx`. Returns the `(n, 1)` correlation values.
    fn value(&self, d: &ArrayBase<impl Data<Elem = F>, Ix2>, theta: &Array1<F>) -> Array2<F>;
}

macro_rules! declare_covariance {
    ($corr:ident, $name:expr) => {
        paste! {
            impl fmt::Display for [<$corr Corr>] {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, $name)
                }
            }
        }
    };
}

/// Squared exponential kernel: `r(d) = exp(-sum_j theta_j * d_j^2)`
///
/// Sample paths of the corresponding process are infinitely differentiable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredExponentialCorr();
declare_covariance!(SquaredExponential, "SquaredExponential");

impl<F: Float> CovarianceModel<F> for SquaredExponentialCorr {
    fn value(&self, d: &ArrayBase<impl Data<Elem = F>, Ix2>, theta: &Array1<F>) -> Array2<F> {
        let wd = d.mapv(|v| v * v).dot(theta);
        wd.mapv(|v| (-v).exp()).insert_axis(Axis(1))
    }
}

/// Absolute exponential kernel: `r(d) = exp(-sum_j theta_j * |d_j|)`
///
/// Sample paths are continuous but not differentiable
/// (Ornstein-Uhlenbeck process in one dimension).
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsoluteExponentialCorr();
declare_covariance!(AbsoluteExponential, "AbsoluteExponential");

impl<F: Float> CovarianceModel<F> for AbsoluteExponentialCorr {
    fn value(&self, d: &ArrayBase<impl Data<Elem = F>, Ix2>, theta: &Array1<F>) -> Array2<F> {
        let wd = d.mapv(|v| v.abs()).dot(theta);
        wd.mapv(|v| (-v).exp()).insert_axis(Axis(1))
    }
}

/// Matern 3/2 kernel:
/// `r(d) = prod_j (1 + sqrt(3) * theta_j * |d_j|) * exp(-sqrt(3) * theta_j * |d_j|)`
#[derive(Clone, Copy, Debug, Default)]
pub struct Matern32Corr();
declare_covariance!(Matern32, "Matern32");

impl<F: Float> CovarianceModel<F> for Matern32Corr {
    fn value(&self, d: &ArrayBase<impl Data<Elem = F>, Ix2>, theta: &Array1<F>) -> Array2<F> {
        let sqrt3 = F::cast(3.).sqrt();
        let wd = d.mapv(|v| v.abs()) * &theta.mapv(|v| v * sqrt3);
        let poly = wd.map_axis(Axis(1), |row| row.fold(F::one(), |acc, &v| acc * (F::one() + v)));
        let exp = wd.sum_axis(Axis(1)).mapv(|v| (-v).exp());
        (poly * exp).insert_axis(Axis(1))
    }
}

/// Matern 5/2 kernel:
/// `r(d) = prod_j (1 + sqrt(5) * theta_j * |d_j| + 5/3 * theta_j^2 * d_j^2)
///         * exp(-sqrt(5) * theta_j * |d_j|)`
#[derive(Clone, Copy, Debug, Default)]
pub struct Matern52Corr();
declare_covariance!(Matern52, "Matern52");

impl<F: Float> CovarianceModel<F> for Matern52Corr {
    fn value(&self, d: &ArrayBase<impl Data<Elem = F>, Ix2>, theta: &Array1<F>) -> Array2<F> {
        let sqrt5 = F::cast(5.).sqrt();
        let wd = d.mapv(|v| v.abs()) * &theta.mapv(|v| v * sqrt5);
        let poly = wd.map_axis(Axis(1), |row| {
            row.fold(F::one(), |acc, &v| {
                acc * (F::one() + v + v * v / F::cast(3.))
            })
        });
        let exp = wd.sum_axis(Axis(1)).mapv(|v| (-v).exp());
        (poly * exp).insert_axis(Axis(1))
    }
}
