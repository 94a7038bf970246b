//! Model fitness criteria used to compare candidate sparse bases.
//!
//! Scores are relative generalization errors, the lower the better, so
//! candidates of different sizes can be compared directly.

use crate::design::{solve_least_squares, LeastSquaresMethod};
use crate::errors::{ChaosError, Result};
use linfa_linalg::qr::QR;
use linfa_linalg::triangular::{SolveTriangularInplace, UPLO};
use ndarray::{Array1, Array2, Axis};

/// Criterion scoring a basis against observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FittingCriterion {
    /// Analytical leave-one-out error from the hat-matrix leverages, with
    /// the small-sample correction factor
    CorrectedLeaveOneOut,
    /// Cross-validation over the given number of folds, assembled by
    /// striding so folds interleave over the design
    KFold(usize),
}

impl Default for FittingCriterion {
    fn default() -> Self {
        FittingCriterion::CorrectedLeaveOneOut
    }
}

fn sample_variance(y: &Array1<f64>) -> f64 {
    let n = y.len() as f64;
    let mean = y.sum() / n;
    y.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n
}

impl FittingCriterion {
    /// Relative generalization error of the least-squares fit of `y` on the
    /// columns of `phi`
    pub fn score(&self, phi: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let (n, p) = phi.dim();
        if y.len() != n {
            return Err(ChaosError::InvalidArgumentError(format!(
                "{} observations for a design of {n} points",
                y.len()
            )));
        }
        match *self {
            FittingCriterion::CorrectedLeaveOneOut => corrected_loo(phi, y),
            FittingCriterion::KFold(k) => {
                if k < 2 || k > n {
                    return Err(ChaosError::InvalidArgumentError(format!(
                        "{k} folds for {n} observations"
                    )));
                }
                if n - n.div_ceil(k) <= p {
                    return Err(ChaosError::NumericalError(format!(
                        "folds of {n} points leave fewer training points than \
                         the {p} basis terms"
                    )));
                }
                kfold(phi, y, k)
            }
        }
    }
}

/// Leave-one-out error computed without refitting, through the leverages
/// `h_i` of the hat matrix, then inflated by the correction factor
/// `(n / (n - p)) * (1 + tr((Phi^T Phi)^-1))`.
fn corrected_loo(phi: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
    let (n, p) = phi.dim();
    if n <= p {
        return Err(ChaosError::NumericalError(format!(
            "leave-one-out needs more than {p} observations, got {n}"
        )));
    }
    let (q, r) = phi.qr()?.into_decomp();
    let rmax = r.diag().iter().fold(0_f64, |m, &d| m.max(d.abs()));
    if r.diag().iter().any(|&d| d.abs() <= f64::EPSILON * n as f64 * rmax) {
        return Err(ChaosError::NumericalError(
            "rank-deficient design matrix in leave-one-out".to_string(),
        ));
    }
    let coef = r.solve_triangular_into(
        q.t().dot(&y.view().insert_axis(Axis(1))),
        UPLO::Upper,
    )?;
    let fitted = phi.dot(&coef).remove_axis(Axis(1));

    let mut loo = 0.;
    for i in 0..n {
        let h: f64 = q.row(i).iter().map(|&v| v * v).sum();
        let denom = (1. - h).max(f64::EPSILON);
        let e = (y[i] - fitted[i]) / denom;
        loo += e * e;
    }
    loo /= n as f64;

    // tr((Phi^T Phi)^-1) is the squared Frobenius norm of R^-1
    let r_inv = r.solve_triangular_into(Array2::eye(p), UPLO::Upper)?;
    let trace: f64 = r_inv.iter().map(|&v| v * v).sum();
    let correction = n as f64 / (n - p) as f64 * (1. + trace);

    let var = sample_variance(y);
    if var > f64::EPSILON {
        Ok(loo * correction / var)
    } else {
        Ok(loo * correction)
    }
}

fn kfold(phi: &Array2<f64>, y: &Array1<f64>, k: usize) -> Result<f64> {
    let n = phi.nrows();
    let mut sq_err = 0.;
    for fold in 0..k {
        let test: Vec<usize> = (0..n).filter(|i| i % k == fold).collect();
        let train: Vec<usize> = (0..n).filter(|i| i % k != fold).collect();
        let phi_train = phi.select(Axis(0), &train);
        let y_train = y
            .select(Axis(0), &train)
            .insert_axis(Axis(1));
        let coef = solve_least_squares(&phi_train, &y_train, LeastSquaresMethod::Qr)?;
        let phi_test = phi.select(Axis(0), &test);
        let pred = phi_test.dot(&coef).remove_axis(Axis(1));
        for (row, &i) in test.iter().enumerate() {
            let e = y[i] - pred[row];
            sq_err += e * e;
        }
    }
    let mse = sq_err / n as f64;
    let var = sample_variance(y);
    if var > f64::EPSILON {
        Ok(mse / var)
    } else {
        Ok(mse)
    }
}
