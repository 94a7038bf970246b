//! `uqbox-kl` decomposes second-order stochastic processes on their
//! Karhunen-Loeve basis: the orthonormal modes and decreasing variances of
//! the process, truncated to a prescribed fraction of the total variance.
//!
//! Three discretizations are available: [`KarhunenLoeveSvd`] works on an
//! empirical [`ProcessSample`], while [`KarhunenLoeveP1`] (finite elements)
//! and [`KarhunenLoeveQuadrature`] (collocation) work directly on a
//! [`CovarianceKernel`].
//!
//! ```no_run
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//! use uqbox_kl::{
//!     AbsoluteExponentialKernel, GaussianProcessSampler, KarhunenLoeveSvd, Mesh,
//! };
//!
//! let mesh = Mesh::interval(-1., 1., 128).expect("mesh");
//! let kernel = AbsoluteExponentialKernel { amplitude: 1., scale: 1. };
//! let sampler = GaussianProcessSampler::new(&kernel, mesh).expect("sampler");
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! let sample = sampler.sample_with_rng(100, &mut rng).expect("sample");
//!
//! let result = KarhunenLoeveSvd::new(0.001).decompose(&sample).expect("decomposition");
//! println!(
//!     "{} modes carry {:.3} of the variance",
//!     result.n_modes(),
//!     result.variance_fraction()
//! );
//! ```
#![warn(missing_docs)]

mod errors;
mod kernels;
mod mesh;
mod p1;
mod process;
mod quadrature;
mod result;
mod svd;

pub use errors::{KlError, Result};
pub use kernels::{AbsoluteExponentialKernel, CovarianceKernel, SquaredExponentialKernel};
pub use mesh::Mesh;
pub use p1::KarhunenLoeveP1;
pub use process::{GaussianProcessSampler, ProcessSample};
pub use quadrature::KarhunenLoeveQuadrature;
pub use result::KarhunenLoeveResult;
pub use svd::KarhunenLoeveSvd;
