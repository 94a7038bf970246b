/*!
This library implements Gaussian process regression, also known as Kriging,
on top of [ndarray](https://github.com/rust-ndarray/ndarray) and
[linfa](https://github.com/rust-ml/linfa).

A fitted model interpolates (or regresses, depending on the nugget) scalar
observations and provides besides the predicted values the posterior variances
and conditioned trajectories of the underlying process.

* trend models: constant, linear or quadratic (Ordinary/Universal Kriging),
* covariance models: squared exponential, absolute exponential,
  Matern 3/2, Matern 5/2,
* hyperparameters tuned by concentrated likelihood maximization
  with the derivative-free COBYLA optimizer and LHS-seeded multistart,
  or held fixed,
* nugget regularization with optional automatic growth when the correlation
  matrix cannot be factorized,
* Q2 cross-validation scores.

# Example

```no_run
use uqbox_gp::Kriging;
use linfa::prelude::*;
use ndarray::{arr1, arr2};

let xt = arr2(&[[0.0], [1.0], [2.5], [4.0], [5.0]]);
let yt = arr1(&[0.0, 0.8, 0.6, -0.7, -1.0]);
let gp = Kriging::<f64>::params()
    .fit(&Dataset::new(xt, yt))
    .expect("Kriging fitted");
let ypred = gp.predict(&arr2(&[[3.1]])).expect("prediction");
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
/// Covariance (correlation kernel) models
pub mod covariance_models;
mod errors;
mod metrics;
mod optimization;
mod parameters;
/// Trend (mean) models
pub mod trend_models;
mod utils;

pub use algorithm::*;
pub use errors::*;
pub use metrics::*;
pub use parameters::*;
