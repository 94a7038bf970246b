//! `uqbox-chaos` builds sparse polynomial chaos expansions: surrogate models
//! expressed on an orthonormal polynomial basis of the standardized inputs,
//! whose coefficients expose the moments and the Sobol' sensitivity indices
//! of the response in closed form.
//!
//! The expansion is fitted from an input/output sample through the `linfa`
//! [`Fit`](linfa::prelude::Fit) trait:
//!
//! ```no_run
//! use linfa::prelude::*;
//! use ndarray::{array, Array2};
//! use uqbox_chaos::{
//!     FunctionalChaos, JointDistribution, LinearEnumerateFunction, Marginal,
//! };
//!
//! let distribution = JointDistribution::independent(vec![
//!     Marginal::uniform(-1., 1.).unwrap(),
//!     Marginal::uniform(-1., 1.).unwrap(),
//! ])
//! .unwrap();
//! let enumerate = LinearEnumerateFunction::new(2).unwrap();
//!
//! let x: Array2<f64> = array![[0., 0.], [0.5, -0.5], [-0.5, 0.5], [1., 1.]];
//! let y: Array2<f64> = x.map_axis(ndarray::Axis(1), |r| r[0] + r[0] * r[1])
//!     .insert_axis(ndarray::Axis(1));
//!
//! let chaos = FunctionalChaos::params(distribution, enumerate)
//!     .degree(1)
//!     .fit(&Dataset::new(x, y))
//!     .expect("chaos fit");
//! println!("mean = {}", chaos.mean());
//! println!("sobol = {:?}", chaos.sobol_indices());
//! ```
#![warn(missing_docs)]

mod adaptive;
mod algorithm;
mod basis;
mod design;
mod distribution;
mod enumerate;
mod errors;
mod fitting;
mod lars;
mod polynomials;
mod sobol;
mod transformation;
mod validation;

pub use adaptive::{AdaptiveStrategy, SelectionHistory, SelectionStep};
pub use algorithm::{ChaosParams, ChaosValidParams, FunctionalChaos, Projection};
pub use basis::{ChaosBasis, GramSchmidtBasis, OrthogonalBasis};
pub use design::{solve_least_squares, DesignProxy, LeastSquaresMethod};
pub use distribution::{Copula, JointDistribution, Marginal};
pub use enumerate::{
    BoundedEnumerateFunction, EnumerateFunction, HyperbolicEnumerateFunction,
    LinearEnumerateFunction,
};
pub use errors::{ChaosError, Result};
pub use fitting::FittingCriterion;
pub use lars::{lars_path, LarsStep};
pub use polynomials::PolynomialFamily;
pub use sobol::SobolIndices;
pub use transformation::IsoProbabilisticTransform;
pub use validation::MetaModelValidation;
