//! Trend models for the mean part of a Gaussian process prior.
//!
//! The trend is a linear combination `beta^T f(x)` of basis functions
//! whose weights are estimated by generalized least squares during training.

use linfa::Float;
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2, concatenate};
use paste::paste;
use std::fmt;

/// A trait for trend models used by Gaussian process regression.
pub trait TrendModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync + Send {
    /// Compute the basis function values at a set of `n` points
    /// specified as a `(n, nx)` matrix. Returns a `(n, p)` matrix
    /// where `p` is the number of basis functions.
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F>;
}

macro_rules! declare_trend {
    ($trend:ident) => {
        paste! {
            impl fmt::Display for [<$trend Trend>] {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, stringify!($trend))
                }
            }
        }
    };
}

/// A constant trend: the process mean is a single unknown level.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantTrend();
declare_trend!(Constant);

impl<F: Float> TrendModel<F> for ConstantTrend {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        Array2::<F>::ones((x.nrows(), 1))
    }
}

/// A linear trend: basis functions are `1, x1, ..., xnx`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearTrend();
declare_trend!(Linear);

impl<F: Float> TrendModel<F> for LinearTrend {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let ones = Array2::ones((x.nrows(), 1));
        concatenate(Axis(1), &[ones.view(), x.view()]).unwrap()
    }
}

/// A quadratic trend: basis functions are `1`, the `xi` and all the
/// second-order products `xi * xj` with `i <= j`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadraticTrend();
declare_trend!(Quadratic);

impl<F: Float> TrendModel<F> for QuadraticTrend {
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let (n, nx) = x.dim();
        let p = 1 + nx + nx * (nx + 1) / 2;
        let mut res = Array2::<F>::ones((n, p));
        for r in 0..n {
            let mut k = 1 + nx;
            for i in 0..nx {
                res[[r, 1 + i]] = x[[r, i]];
                for j in i..nx {
                    res[[r, k]] = x[[r, i]] * x[[r, j]];
                    k += 1;
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_constant() {
        let x = array![[1., 2.], [3., 4.]];
        let f = ConstantTrend().value(&x);
        assert_abs_diff_eq!(f, array![[1.], [1.]]);
    }

    #[test]
    fn test_linear() {
        let x = array![[1., 2.]];
        let f = LinearTrend().value(&x);
        assert_abs_diff_eq!(f, array![[1., 1., 2.]]);
    }

    #[test]
    fn test_quadratic() {
        let x = array![[2., 3.]];
        let f = QuadraticTrend().value(&x);
        assert_abs_diff_eq!(f, array![[1., 2., 3., 4., 6., 9.]]);
    }
}
