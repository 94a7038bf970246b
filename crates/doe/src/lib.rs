/*!
Sampling methods and quadrature rules used throughout the `uqbox` toolbox.

A sampling method generates a set of points (a design of experiments) within a
design space `xlimits`. The design space is defined as a 2D ndarray `(nx, 2)`,
specifying lower bound and upper bound of each of the `nx` components of the
samples `x`.

Example:
```
use uqbox_doe::{FullFactorial, Lhs, LhsKind, Random, SamplingMethod};
use ndarray::arr2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Design space is defined as [5., 10.] x [0., 1.], samples are 2-dimensional.
let xlimits = arr2(&[[5., 10.], [0., 1.]]);
// We generate five samples using centered Latin Hypercube sampling.
let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(5);
// or else with FullFactorial sampling
let samples = FullFactorial::new(&xlimits).sample(5);
// or else randomly with random generator for reproducibility
let samples = Random::new(&xlimits).with_rng(Xoshiro256Plus::seed_from_u64(42)).sample(5);
```

Besides random designs, the crate provides Gauss quadrature rules
([`gauss_legendre`], [`gauss_hermite`]) and their tensorization
([`GaussProduct`]) which serve integration-based projections.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod full_factorial;
mod gauss;
mod lhs;
mod random;
mod traits;

pub use full_factorial::*;
pub use gauss::*;
pub use lhs::*;
pub use random::*;
pub use traits::*;
