//! Functional chaos expansion: projection of a model response onto an
//! orthonormal polynomial basis of the standardized inputs.

use crate::adaptive::{AdaptiveStrategy, SelectionHistory, SelectionStep};
use crate::basis::{ChaosBasis, GramSchmidtBasis, OrthogonalBasis};
use crate::design::{solve_least_squares, DesignProxy, LeastSquaresMethod};
use crate::distribution::JointDistribution;
use crate::enumerate::EnumerateFunction;
use crate::errors::{ChaosError, Result};
use crate::fitting::FittingCriterion;
use crate::lars::lars_path;
use crate::transformation::IsoProbabilisticTransform;
use linfa::prelude::{DatasetBase, Fit, PredictInplace};
use log::warn;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::collections::BTreeSet;
use std::fmt;

/// How the coefficients are computed from the experimental design.
#[derive(Clone, Debug)]
pub enum Projection {
    /// Discrete projection `c_k = sum_i w_i phi_k(u_i) y_i`, exact when the
    /// design carries the weights of a quadrature rule
    Integration,
    /// Regression of the observations on the basis terms
    LeastSquares {
        /// Decomposition used for the dense solves
        method: LeastSquaresMethod,
        /// Run least angle regression to select a sparse subset of terms
        sparse: bool,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::LeastSquares {
            method: LeastSquaresMethod::default(),
            sparse: false,
        }
    }
}

/// Validated parameters of a chaos expansion fit.
#[derive(Clone, Debug)]
pub struct ChaosValidParams<E: EnumerateFunction> {
    distribution: JointDistribution,
    enumerate: E,
    degree: usize,
    projection: Projection,
    strategy: AdaptiveStrategy,
    criterion: FittingCriterion,
    weights: Option<Array1<f64>>,
    gram_schmidt: bool,
    gram_schmidt_sample: usize,
    seed: u64,
}

impl<E: EnumerateFunction> ChaosValidParams<E> {
    /// The input distribution
    pub fn distribution(&self) -> &JointDistribution {
        &self.distribution
    }

    /// The enumeration of the candidate multi-indices
    pub fn enumerate(&self) -> &E {
        &self.enumerate
    }

    /// Total degree of the full candidate basis
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The projection computing the coefficients
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The basis adaptivity strategy
    pub fn strategy(&self) -> &AdaptiveStrategy {
        &self.strategy
    }

    /// The criterion scoring candidate sparse bases
    pub fn criterion(&self) -> FittingCriterion {
        self.criterion
    }
}

/// Parameters of a chaos expansion fit, builder style.
#[derive(Clone, Debug)]
pub struct ChaosParams<E: EnumerateFunction>(pub(crate) ChaosValidParams<E>);

impl<E: EnumerateFunction> ChaosParams<E> {
    /// Default parameters for the given input distribution and enumeration
    pub fn new(distribution: JointDistribution, enumerate: E) -> ChaosParams<E> {
        ChaosParams(ChaosValidParams {
            distribution,
            enumerate,
            degree: 3,
            projection: Projection::default(),
            strategy: AdaptiveStrategy::default(),
            criterion: FittingCriterion::default(),
            weights: None,
            gram_schmidt: false,
            gram_schmidt_sample: 1000,
            seed: 42,
        })
    }

    /// Set the total degree of the full candidate basis
    pub fn degree(mut self, degree: usize) -> Self {
        self.0.degree = degree;
        self
    }

    /// Set the projection computing the coefficients
    pub fn projection(mut self, projection: Projection) -> Self {
        self.0.projection = projection;
        self
    }

    /// Set the basis adaptivity strategy
    pub fn strategy(mut self, strategy: AdaptiveStrategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    /// Set the criterion scoring candidate sparse bases
    pub fn criterion(mut self, criterion: FittingCriterion) -> Self {
        self.0.criterion = criterion;
        self
    }

    /// Set the integration weights attached to the design points
    pub fn weights(mut self, weights: Array1<f64>) -> Self {
        self.0.weights = Some(weights);
        self
    }

    /// Orthonormalize the basis empirically by Gram-Schmidt instead of
    /// tensorizing the standard families
    pub fn gram_schmidt(mut self, gram_schmidt: bool) -> Self {
        self.0.gram_schmidt = gram_schmidt;
        self
    }

    /// Set the size of the sample supporting the Gram-Schmidt
    /// orthonormalization
    pub fn gram_schmidt_sample(mut self, size: usize) -> Self {
        self.0.gram_schmidt_sample = size;
        self
    }

    /// Set the seed of the internal random draws
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<E: EnumerateFunction> linfa::ParamGuard for ChaosParams<E> {
    type Checked = ChaosValidParams<E>;
    type Error = ChaosError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = &self.0;
        if p.enumerate.dimension() != p.distribution.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "enumeration over {} components for a distribution of \
                 dimension {}",
                p.enumerate.dimension(),
                p.distribution.dimension()
            )));
        }
        if p.degree == 0 {
            return Err(ChaosError::InvalidArgumentError(
                "chaos degree must be at least 1".to_string(),
            ));
        }
        p.strategy.validate()?;
        if matches!(p.projection, Projection::Integration)
            && !matches!(p.strategy, AdaptiveStrategy::Fixed { .. })
        {
            return Err(ChaosError::ConfigurationError(
                "integration projection only supports the fixed strategy".to_string(),
            ));
        }
        if let Some(w) = &p.weights {
            if w.iter().any(|&wi| wi < 0.) || w.sum() <= 0. {
                return Err(ChaosError::InvalidArgumentError(
                    "integration weights must be non-negative with a positive sum"
                        .to_string(),
                ));
            }
        }
        if p.gram_schmidt && p.gram_schmidt_sample == 0 {
            return Err(ChaosError::InvalidArgumentError(
                "the Gram-Schmidt sample must hold at least one point".to_string(),
            ));
        }
        Ok(p)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// A fitted functional chaos expansion.
#[derive(Clone, Debug)]
pub struct FunctionalChaos<E: EnumerateFunction> {
    transform: IsoProbabilisticTransform,
    basis: ChaosBasis<E>,
    active: Vec<usize>,
    multi_indices: Vec<Vec<usize>>,
    /// (active terms, outputs)
    coefficients: Array2<f64>,
    residuals: Array1<f64>,
    relative_errors: Array1<f64>,
    history: Vec<SelectionHistory>,
    training_data: (Array2<f64>, Array2<f64>),
}

impl<E: EnumerateFunction> FunctionalChaos<E> {
    /// Default fit parameters for the given input distribution and
    /// enumeration of multi-indices
    pub fn params(distribution: JointDistribution, enumerate: E) -> ChaosParams<E> {
        ChaosParams::new(distribution, enumerate)
    }

    /// The iso-probabilistic transformation to the standardized space
    pub fn transform(&self) -> &IsoProbabilisticTransform {
        &self.transform
    }

    /// The orthonormal basis of the expansion
    pub fn basis(&self) -> &ChaosBasis<E> {
        &self.basis
    }

    /// Enumeration indices of the retained terms, increasing
    pub fn active_terms(&self) -> &[usize] {
        &self.active
    }

    /// Multi-indices of the retained terms
    pub fn multi_indices(&self) -> &[Vec<usize>] {
        &self.multi_indices
    }

    /// Coefficients of the retained terms, one column per output
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Root mean square training residual per output
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    /// Training mean square error relative to the output variance
    pub fn relative_errors(&self) -> &Array1<f64> {
        &self.relative_errors
    }

    /// Trace of the candidate bases examined for each output
    pub fn history(&self) -> &[SelectionHistory] {
        &self.history
    }

    /// The training input and output samples
    pub fn training_data(&self) -> &(Array2<f64>, Array2<f64>) {
        &self.training_data
    }

    /// Mean of the expansion, the coefficient of the constant term
    pub fn mean(&self) -> Array1<f64> {
        for (k, alpha) in self.multi_indices.iter().enumerate() {
            if alpha.iter().all(|&a| a == 0) {
                return self.coefficients.row(k).to_owned();
            }
        }
        Array1::zeros(self.coefficients.ncols())
    }

    /// Variance of the expansion per output, the coefficient energy of the
    /// non-constant terms
    pub fn variance(&self) -> Array1<f64> {
        let mut var = Array1::zeros(self.coefficients.ncols());
        for (k, alpha) in self.multi_indices.iter().enumerate() {
            if alpha.iter().any(|&a| a > 0) {
                for (j, v) in var.iter_mut().enumerate() {
                    *v += self.coefficients[[k, j]] * self.coefficients[[k, j]];
                }
            }
        }
        var
    }

    /// Evaluate the expansion on a `(m, nx)` physical sample
    pub fn predict_values(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let u = self.transform.forward(x);
        let phi = self.basis.matrix(&self.active, &u)?;
        Ok(phi.dot(&self.coefficients))
    }
}

impl<E: EnumerateFunction> fmt::Display for FunctionalChaos<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FunctionalChaos(terms={}, outputs={})",
            self.active.len(),
            self.coefficients.ncols()
        )
    }
}

impl<D: Data<Elem = f64>, E: EnumerateFunction> PredictInplace<ArrayBase<D, Ix2>, Array2<f64>>
    for FunctionalChaos<E>
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array2<f64>) {
        assert_eq!(
            x.nrows(),
            y.nrows(),
            "The number of data points must match the number of output targets."
        );
        let values = self
            .predict_values(&x.to_owned())
            .expect("prediction failure");
        y.assign(&values);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array2<f64> {
        Array2::zeros((x.nrows(), self.coefficients.ncols()))
    }
}

impl<D: Data<Elem = f64>, E: EnumerateFunction> Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix2>, ChaosError>
    for ChaosValidParams<E>
{
    type Object = FunctionalChaos<E>;

    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix2>>,
    ) -> Result<Self::Object> {
        let x = dataset.records().to_owned();
        let y = dataset.targets().to_owned();
        let (n, nx) = x.dim();
        let ny = y.ncols();
        if y.nrows() != n {
            return Err(ChaosError::InvalidArgumentError(format!(
                "{} outputs for {n} input points",
                y.nrows()
            )));
        }
        if nx != self.distribution.dimension() {
            return Err(ChaosError::InvalidArgumentError(format!(
                "inputs have {nx} components, the distribution has {}",
                self.distribution.dimension()
            )));
        }
        if n == 0 || ny == 0 {
            return Err(ChaosError::InvalidArgumentError(
                "empty training sample".to_string(),
            ));
        }
        if let Some(w) = &self.weights {
            if w.len() != n {
                return Err(ChaosError::InvalidArgumentError(format!(
                    "{} integration weights for {n} design points",
                    w.len()
                )));
            }
        }

        let transform = IsoProbabilisticTransform::new(self.distribution.clone())?;
        let u = transform.forward(&x);

        let full_size = self.enumerate.strata_cumulated_cardinal(self.degree);
        let candidate_size = match self.strategy {
            AdaptiveStrategy::Fixed { basis_size: 0 } => full_size,
            AdaptiveStrategy::Fixed { basis_size } => basis_size,
            AdaptiveStrategy::Cleaning { candidate_size, .. } => candidate_size,
            AdaptiveStrategy::Sequential { maximum_size, .. } => maximum_size,
        };

        let basis = if self.gram_schmidt {
            let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);
            let standard = JointDistribution::independent(
                transform
                    .standard_families()
                    .iter()
                    .map(|f| match f {
                        crate::polynomials::PolynomialFamily::Legendre => {
                            crate::distribution::Marginal::Uniform { a: -1., b: 1. }
                        }
                        crate::polynomials::PolynomialFamily::Hermite => {
                            crate::distribution::Marginal::Normal { mu: 0., sigma: 1. }
                        }
                    })
                    .collect(),
            )?;
            let sample = standard.sample_with_rng(self.gram_schmidt_sample, &mut rng)?;
            let weights =
                Array1::from_elem(self.gram_schmidt_sample, 1. / self.gram_schmidt_sample as f64);
            ChaosBasis::GramSchmidt(GramSchmidtBasis::new(
                self.enumerate.clone(),
                &sample,
                &weights,
                candidate_size,
            )?)
        } else {
            ChaosBasis::Tensor(OrthogonalBasis::new(
                transform.standard_families(),
                self.enumerate.clone(),
            )?)
        };

        let mut proxy = DesignProxy::new(basis.clone(), u);
        let mut history = vec![SelectionHistory::default(); ny];

        let (active, coefficients) = match &self.projection {
            Projection::Integration => {
                let weights = match &self.weights {
                    Some(w) => {
                        let total = w.sum();
                        w.mapv(|wi| wi / total)
                    }
                    None => Array1::from_elem(n, 1. / n as f64),
                };
                let terms: Vec<usize> = (0..candidate_size).collect();
                let phi = proxy.matrix(&terms)?;
                let weighted = &y * &weights.view().insert_axis(Axis(1));
                (terms, phi.t().dot(&weighted))
            }
            Projection::LeastSquares { method, sparse } => match self.strategy {
                AdaptiveStrategy::Fixed { .. } => {
                    let terms: Vec<usize> = (0..candidate_size).collect();
                    if *sparse {
                        self.fit_sparse(&mut proxy, &y, &terms, *method, &mut history)?
                    } else {
                        let phi = proxy.matrix(&terms)?;
                        let coef = solve_least_squares(&phi, &y, *method)?;
                        (terms, coef)
                    }
                }
                AdaptiveStrategy::Cleaning {
                    candidate_size,
                    max_retained,
                    significance,
                } => {
                    let terms: Vec<usize> = (0..candidate_size).collect();
                    let phi = proxy.matrix(&terms)?;
                    let coef = solve_least_squares(&phi, &y, *method)?;
                    let mut magnitude: Vec<f64> = (0..candidate_size)
                        .map(|k| {
                            (0..ny).map(|j| coef[[k, j]].abs()).fold(0_f64, f64::max)
                        })
                        .collect();
                    // the constant term is never cleaned away
                    magnitude[0] = f64::INFINITY;
                    let cmax = magnitude[1..].iter().cloned().fold(0_f64, f64::max);
                    let mut kept: Vec<usize> = (0..candidate_size)
                        .filter(|&k| magnitude[k] >= significance * cmax)
                        .collect();
                    if kept.len() > max_retained {
                        kept.sort_by(|&a, &b| {
                            magnitude[b].partial_cmp(&magnitude[a]).unwrap()
                        });
                        kept.truncate(max_retained);
                        kept.sort_unstable();
                    }
                    let phi_kept = proxy.matrix(&kept)?;
                    let coef = solve_least_squares(&phi_kept, &y, *method)?;
                    (kept, coef)
                }
                AdaptiveStrategy::Sequential {
                    initial_size,
                    maximum_size,
                    residual_tolerance,
                } => {
                    let mut size = initial_size.min(maximum_size);
                    loop {
                        let terms: Vec<usize> = (0..size).collect();
                        let phi = proxy.matrix(&terms)?;
                        let coef = solve_least_squares(&phi, &y, *method)?;
                        let residual = &y - &phi.dot(&coef);
                        let rms = (residual.mapv(|r| r * r).sum()
                            / (n * ny) as f64)
                            .sqrt();
                        for h in history.iter_mut() {
                            h.push(SelectionStep {
                                candidate_terms: size,
                                retained_terms: terms.clone(),
                                score: rms,
                            });
                        }
                        if rms <= residual_tolerance || size >= maximum_size {
                            break (terms, coef);
                        }
                        size = (size + size.div_ceil(2)).min(maximum_size);
                    }
                }
            },
        };

        let multi_indices = active
            .iter()
            .map(|&k| basis.multi_index(k))
            .collect::<Result<Vec<_>>>()?;

        let phi = proxy.matrix(&active)?;
        let pred = phi.dot(&coefficients);
        let mut residuals = Array1::zeros(ny);
        let mut relative_errors = Array1::zeros(ny);
        for j in 0..ny {
            let col = y.column(j);
            let mean = col.sum() / n as f64;
            let var = col.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
            let mse = (0..n)
                .map(|i| {
                    let e = col[i] - pred[[i, j]];
                    e * e
                })
                .sum::<f64>()
                / n as f64;
            residuals[j] = mse.sqrt();
            relative_errors[j] = if var > f64::EPSILON { mse / var } else { mse };
        }

        Ok(FunctionalChaos {
            transform,
            basis,
            active,
            multi_indices,
            coefficients,
            residuals,
            relative_errors,
            history,
            training_data: (x, y),
        })
    }
}

impl<E: EnumerateFunction> ChaosValidParams<E> {
    /// Per-output least angle regression over the candidate terms, scored by
    /// the fitting criterion; the final basis is the union of the per-output
    /// winners, refitted densely.
    fn fit_sparse(
        &self,
        proxy: &mut DesignProxy<E>,
        y: &Array2<f64>,
        candidates: &[usize],
        method: LeastSquaresMethod,
        history: &mut [SelectionHistory],
    ) -> Result<(Vec<usize>, Array2<f64>)> {
        let n = y.nrows();
        let phi_full = proxy.matrix(candidates)?;
        let mut union: BTreeSet<usize> = BTreeSet::new();
        union.insert(candidates[0]);

        for (j, h) in history.iter_mut().enumerate() {
            let col = y.column(j).to_owned();
            let path = lars_path(&phi_full, &col, 3 * candidates.len(), 1e-12)?;
            let mut best: Option<(f64, Vec<usize>)> = None;
            for step in &path {
                let mut terms: BTreeSet<usize> =
                    step.active.iter().map(|&k| candidates[k]).collect();
                terms.insert(candidates[0]);
                let terms: Vec<usize> = terms.into_iter().collect();
                if terms.len() >= n {
                    break;
                }
                let phi = proxy.matrix(&terms)?;
                let score = match self.criterion.score(&phi, &col) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("skipping a candidate basis of {} terms: {e}", terms.len());
                        continue;
                    }
                };
                h.push(SelectionStep {
                    candidate_terms: candidates.len(),
                    retained_terms: terms.clone(),
                    score,
                });
                if best.as_ref().map_or(true, |(s, _)| score < *s) {
                    best = Some((score, terms));
                }
            }
            match best {
                Some((_, terms)) => union.extend(terms),
                None => {
                    // no admissible sparse model, keep the constant term
                    warn!("least angle regression kept no term for output {j}");
                }
            }
        }

        let active: Vec<usize> = union.into_iter().collect();
        let phi = proxy.matrix(&active)?;
        let coef = solve_least_squares(&phi, y, method)?;
        Ok((active, coef))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Marginal;
    use crate::enumerate::LinearEnumerateFunction;
    use crate::polynomials::PolynomialFamily;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::{Dataset, Predict};
    use ndarray::array;
    use uqbox_doe::{gauss_legendre, GaussProduct, Lhs, SamplingMethod};

    fn uniform_square() -> JointDistribution {
        JointDistribution::independent(vec![
            Marginal::uniform(-1., 1.).unwrap(),
            Marginal::uniform(-1., 1.).unwrap(),
        ])
        .unwrap()
    }

    fn lhs_sample(n: usize, seed: u64) -> Array2<f64> {
        let limits = array![[-1., 1.], [-1., 1.]];
        Lhs::new(&limits)
            .with_rng(Xoshiro256Plus::seed_from_u64(seed))
            .sample(n)
    }

    // y = 2 + x0 + x0 * x1, polynomial of total degree 2
    fn quadratic_response(x: &Array2<f64>) -> Array2<f64> {
        let mut y = Array2::zeros((x.nrows(), 1));
        for (i, row) in x.rows().into_iter().enumerate() {
            y[[i, 0]] = 2. + row[0] + row[0] * row[1];
        }
        y
    }

    #[test]
    fn test_dense_least_squares_exact_polynomial() {
        let x = lhs_sample(32, 1);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(2)
            .fit(&Dataset::new(x, y))
            .unwrap();

        let xt = lhs_sample(64, 2);
        let yt = quadratic_response(&xt);
        let pred = chaos.predict_values(&xt).unwrap();
        assert_abs_diff_eq!(pred, yt, epsilon = 1e-8);
        assert!(chaos.residuals()[0] < 1e-9);
    }

    #[test]
    fn test_mean_and_variance() {
        let x = lhs_sample(40, 3);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(2)
            .fit(&Dataset::new(x, y))
            .unwrap();
        // E[y] = 2, Var[y] = Var[x0] + Var[x0 x1] = 1/3 + 1/9
        assert_abs_diff_eq!(chaos.mean()[0], 2., epsilon = 1e-8);
        assert_abs_diff_eq!(chaos.variance()[0], 1. / 3. + 1. / 9., epsilon = 1e-8);
    }

    #[test]
    fn test_integration_projection_recovers_coefficients() {
        // exact quadrature design: coefficients of an expansion expressed in
        // the orthonormal basis come back exactly
        let product = GaussProduct::new(vec![gauss_legendre::<f64>(6), gauss_legendre::<f64>(6)]);
        let (nodes, weights) = product.nodes_weights();
        let legendre = PolynomialFamily::Legendre;
        let mut y = Array2::zeros((nodes.nrows(), 1));
        for (i, row) in nodes.rows().into_iter().enumerate() {
            y[[i, 0]] = 1.5 - 0.5 * legendre.eval(1, row[0])
                + 2. * legendre.eval(2, row[1]);
        }
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate.clone())
            .degree(2)
            .projection(Projection::Integration)
            .weights(weights)
            .fit(&Dataset::new(nodes, y))
            .unwrap();
        let c = chaos.coefficients();
        assert_abs_diff_eq!(c[[0, 0]], 1.5, epsilon = 1e-10);
        // term [1, 0] and term [0, 2]
        let i10 = enumerate.linear_index(&[1, 0]).unwrap();
        let i02 = enumerate.linear_index(&[0, 2]).unwrap();
        assert_abs_diff_eq!(c[[i10, 0]], -0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(c[[i02, 0]], 2., epsilon = 1e-10);
    }

    #[test]
    fn test_sparse_selection_prunes_terms() {
        // response uses 3 of the 21 degree-5 terms
        let x = lhs_sample(60, 4);
        let legendre = PolynomialFamily::Legendre;
        let mut y = Array2::zeros((60, 1));
        for (i, row) in x.rows().into_iter().enumerate() {
            y[[i, 0]] = 1. + 3. * legendre.eval(2, row[0]) - 2. * legendre.eval(1, row[1]);
        }
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(5)
            .projection(Projection::LeastSquares {
                method: LeastSquaresMethod::Svd,
                sparse: true,
            })
            .fit(&Dataset::new(x.clone(), y.clone()))
            .unwrap();
        assert!(
            chaos.active_terms().len() < 21,
            "kept {} terms",
            chaos.active_terms().len()
        );
        let pred = chaos.predict_values(&x).unwrap();
        assert_abs_diff_eq!(pred, y, epsilon = 1e-6);
        assert!(!chaos.history()[0].steps().is_empty());
    }

    #[test]
    fn test_cleaning_strategy_discards_small_terms() {
        let x = lhs_sample(80, 5);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(4)
            .strategy(AdaptiveStrategy::Cleaning {
                candidate_size: 15,
                max_retained: 6,
                significance: 1e-6,
            })
            .fit(&Dataset::new(x.clone(), y.clone()))
            .unwrap();
        assert!(chaos.active_terms().len() <= 6);
        // the cleaned basis still holds the 3 terms that matter
        let pred = chaos.predict_values(&x).unwrap();
        assert_abs_diff_eq!(pred, y, epsilon = 1e-7);
    }

    #[test]
    fn test_sequential_strategy_stops_early() {
        let x = lhs_sample(60, 6);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(5)
            .strategy(AdaptiveStrategy::Sequential {
                initial_size: 6,
                maximum_size: 21,
                residual_tolerance: 1e-8,
            })
            .fit(&Dataset::new(x, y))
            .unwrap();
        // degree 2 terms are enough, growth stops before the maximum
        assert!(chaos.active_terms().len() < 21);
        assert!(chaos.residuals()[0] < 1e-8);
    }

    #[test]
    fn test_gram_schmidt_basis_fit() {
        let x = lhs_sample(40, 7);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(2)
            .gram_schmidt(true)
            .gram_schmidt_sample(2000)
            .fit(&Dataset::new(x, y))
            .unwrap();
        let xt = lhs_sample(30, 8);
        let yt = quadratic_response(&xt);
        let pred = chaos.predict_values(&xt).unwrap();
        assert_abs_diff_eq!(pred, yt, epsilon = 1e-6);
    }

    #[test]
    fn test_predict_trait() {
        let x = lhs_sample(32, 9);
        let y = quadratic_response(&x);
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(2)
            .fit(&Dataset::new(x.clone(), y.clone()))
            .unwrap();
        let pred: Array2<f64> = chaos.predict(&x);
        assert_abs_diff_eq!(pred, y, epsilon = 1e-8);
    }

    #[test]
    fn test_multi_output_fit() {
        let x = lhs_sample(40, 10);
        let mut y = Array2::zeros((40, 2));
        for (i, row) in x.rows().into_iter().enumerate() {
            y[[i, 0]] = 1. + row[0];
            y[[i, 1]] = row[1] * row[1];
        }
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let chaos = FunctionalChaos::params(uniform_square(), enumerate)
            .degree(2)
            .fit(&Dataset::new(x.clone(), y.clone()))
            .unwrap();
        let pred = chaos.predict_values(&x).unwrap();
        assert_abs_diff_eq!(pred, y, epsilon = 1e-8);
        assert_abs_diff_eq!(chaos.mean()[1], 1. / 3., epsilon = 1e-8);
    }

    #[test]
    fn test_degree_zero_rejected() {
        let enumerate = LinearEnumerateFunction::new(2).unwrap();
        let params = FunctionalChaos::params(uniform_square(), enumerate).degree(0);
        use linfa::ParamGuard;
        assert!(params.check_ref().is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let enumerate = LinearEnumerateFunction::new(3).unwrap();
        let params = FunctionalChaos::params(uniform_square(), enumerate);
        use linfa::ParamGuard;
        assert!(params.check_ref().is_err());
    }
}
