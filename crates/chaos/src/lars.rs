//! Least angle regression with the lasso modification, used to select a
//! sparse subset of basis terms.
//!
//! The path starts from the empty model and moves the coefficients of the
//! active terms along the equiangular direction until an inactive term
//! reaches the same correlation with the residual, or an active coefficient
//! crosses zero and leaves the model.

use crate::errors::{ChaosError, Result};
use linfa_linalg::cholesky::Cholesky;
use linfa_linalg::triangular::{SolveTriangular, UPLO};
use log::warn;
use ndarray::{Array1, Array2};

const LARS_CORRELATION_TOL: f64 = 1e-12;

/// One model visited along the regression path.
#[derive(Clone, Debug)]
pub struct LarsStep {
    /// Candidate indices of the active terms, in order of activation
    pub active: Vec<usize>,
    /// Coefficients over all candidates, zero outside the active set
    pub coefficients: Array1<f64>,
}

/// Compute the lasso-modified least angle regression path of `y` over the
/// columns of `phi`.
///
/// The path stops after `max_steps` moves, when every candidate is active,
/// or when the root mean square residual falls below `residual_tol`. A
/// response with no correlation to any candidate yields an empty path.
pub fn lars_path(
    phi: &Array2<f64>,
    y: &Array1<f64>,
    max_steps: usize,
    residual_tol: f64,
) -> Result<Vec<LarsStep>> {
    let (n, p) = phi.dim();
    if y.len() != n {
        return Err(ChaosError::InvalidArgumentError(format!(
            "{} observations for a design of {n} points",
            y.len()
        )));
    }
    let max_active = p.min(n);
    let mut coef = Array1::<f64>::zeros(p);
    let mut active: Vec<usize> = Vec::new();
    let mut path = Vec::new();
    // a dropped term must not re-enter on the very next move
    let mut just_dropped: Option<usize> = None;

    for _ in 0..max_steps {
        let residual = y - &phi.dot(&coef);
        let rms = (residual.mapv(|r| r * r).sum() / n as f64).sqrt();
        if rms < residual_tol {
            break;
        }
        let c = phi.t().dot(&residual);

        // most correlated inactive candidate, ties to the lowest index
        let mut best: Option<(usize, f64)> = None;
        for j in 0..p {
            if active.contains(&j) || just_dropped == Some(j) {
                continue;
            }
            let cj = c[j].abs();
            if best.map_or(true, |(_, cb)| cj > cb) {
                best = Some((j, cj));
            }
        }
        let cmax = match best {
            Some((j, cj)) if cj > LARS_CORRELATION_TOL => {
                if active.len() >= max_active {
                    break;
                }
                active.push(j);
                cj.max(
                    active
                        .iter()
                        .map(|&k| c[k].abs())
                        .fold(0_f64, f64::max),
                )
            }
            _ => {
                // nothing left to add
                if active.is_empty() {
                    break;
                }
                active.iter().map(|&k| c[k].abs()).fold(0_f64, f64::max)
            }
        };
        if cmax <= LARS_CORRELATION_TOL {
            break;
        }
        just_dropped = None;

        let na = active.len();
        let signs: Vec<f64> = active.iter().map(|&k| c[k].signum()).collect();

        // equiangular direction from the signed active Gram matrix
        let mut gram = Array2::<f64>::zeros((na, na));
        for (i, &ki) in active.iter().enumerate() {
            for (j, &kj) in active.iter().enumerate() {
                gram[[i, j]] =
                    signs[i] * signs[j] * phi.column(ki).dot(&phi.column(kj));
            }
        }
        let chol = match gram.cholesky() {
            Ok(l) => l,
            Err(_) => {
                warn!("active set became collinear after {} terms, stopping", na);
                active.pop();
                break;
            }
        };
        let ones = Array2::from_elem((na, 1), 1.);
        let half = chol.solve_triangular(&ones, UPLO::Lower)?;
        let w0 = chol.t().solve_triangular(&half, UPLO::Upper)?;
        let w0 = w0.column(0).to_owned();
        let a_norm = 1. / w0.sum().sqrt();
        let w = w0.mapv(|v| v * a_norm);

        // u = sum_k s_k w_k phi_k and its correlations with every candidate
        let mut u = Array1::<f64>::zeros(n);
        for (i, &k) in active.iter().enumerate() {
            u.zip_mut_with(&phi.column(k), |ui, &pki| *ui += signs[i] * w[i] * pki);
        }
        let a = phi.t().dot(&u);

        // step to the next candidate entry
        let mut gamma = cmax / a_norm;
        for j in 0..p {
            if active.contains(&j) {
                continue;
            }
            for value in [
                (cmax - c[j]) / (a_norm - a[j]),
                (cmax + c[j]) / (a_norm + a[j]),
            ] {
                if value > LARS_CORRELATION_TOL && value < gamma {
                    gamma = value;
                }
            }
        }

        // lasso modification: stop earlier if an active coefficient crosses
        // zero, and drop it from the model
        let mut drop_index: Option<usize> = None;
        for (i, &k) in active.iter().enumerate() {
            let direction = signs[i] * w[i];
            if direction.abs() <= LARS_CORRELATION_TOL {
                continue;
            }
            let crossing = -coef[k] / direction;
            if crossing > LARS_CORRELATION_TOL && crossing < gamma {
                gamma = crossing;
                drop_index = Some(i);
            }
        }

        for (i, &k) in active.iter().enumerate() {
            coef[k] += gamma * signs[i] * w[i];
        }
        if let Some(i) = drop_index {
            let k = active.remove(i);
            coef[k] = 0.;
            just_dropped = Some(k);
        }

        path.push(LarsStep {
            active: active.clone(),
            coefficients: coef.clone(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // orthonormal 4x4 design (normalized Hadamard matrix)
    fn hadamard() -> Array2<f64> {
        array![
            [0.5, 0.5, 0.5, 0.5],
            [0.5, -0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5, 0.5],
        ]
    }

    #[test]
    fn test_orthonormal_design_exact_recovery() {
        let phi = hadamard();
        let truth = array![0., 3., 0., -2.];
        let y = phi.dot(&truth);
        let path = lars_path(&phi, &y, 20, 1e-12).unwrap();
        let last = path.last().unwrap();
        assert_abs_diff_eq!(last.coefficients, truth, epsilon = 1e-10);
        // terms activate by decreasing correlation
        assert_eq!(last.active, vec![1, 3]);
    }

    #[test]
    fn test_inactive_coefficients_stay_zero() {
        let phi = hadamard();
        let y = phi.dot(&array![1., 0., -4., 0.5]);
        let path = lars_path(&phi, &y, 20, 1e-12).unwrap();
        for step in &path {
            for j in 0..4 {
                if !step.active.contains(&j) {
                    assert_abs_diff_eq!(step.coefficients[j], 0.);
                }
            }
        }
    }

    #[test]
    fn test_residual_decreases_along_path() {
        // correlated, non-orthogonal design
        let phi = array![
            [1., 0.9, 0.1],
            [1., 0.8, -0.2],
            [-1., -0.7, 0.3],
            [1., 1.1, 0.7],
            [-1., -1.2, -0.5],
            [1., 0.6, 0.2],
        ];
        let y = array![2.1, 1.7, -2.3, 3.0, -2.8, 1.9];
        let path = lars_path(&phi, &y, 50, 1e-12).unwrap();
        assert!(!path.is_empty());
        let mut last_rms = f64::INFINITY;
        for step in &path {
            let r = &y - &phi.dot(&step.coefficients);
            let rms = (r.mapv(|v| v * v).sum() / 6.).sqrt();
            assert!(rms <= last_rms + 1e-10);
            last_rms = rms;
        }
    }

    #[test]
    fn test_active_sets_nested() {
        let phi = hadamard();
        let y = phi.dot(&array![1., 3., -4., 0.5]);
        let path = lars_path(&phi, &y, 20, 1e-12).unwrap();
        for pair in path.windows(2) {
            assert_eq!(pair[1].active.len(), pair[0].active.len() + 1);
            for j in &pair[0].active {
                assert!(pair[1].active.contains(j));
            }
        }
    }

    #[test]
    fn test_zero_response_empty_path() {
        let phi = hadamard();
        let y = Array1::zeros(4);
        let path = lars_path(&phi, &y, 20, 1e-12).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let phi = hadamard();
        let y = Array1::zeros(3);
        assert!(lars_path(&phi, &y, 20, 1e-12).is_err());
    }
}
