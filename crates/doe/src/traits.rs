use linfa::Float;
use ndarray::{Array2, Axis};

/// A trait implemented by sampling methods which generate designs of
/// experiments within a given sampling space.
pub trait SamplingMethod<F: Float> {
    /// Returns the sampling space `(nx, 2)` as (lower bound, upper bound) rows
    fn sampling_space(&self) -> &Array2<F>;

    /// Generates a `(ns, nx)` design in the unit hypercube `[0., 1.]^nx`
    fn normalized_sample(&self, ns: usize) -> Array2<F>;

    /// Generates a `(ns, nx)` design within the sampling space
    fn sample(&self, ns: usize) -> Array2<F> {
        let xlimits = self.sampling_space();
        let lower = xlimits.index_axis(Axis(1), 0);
        let upper = xlimits.index_axis(Axis(1), 1);
        let scale = &upper.to_owned() - &lower;
        self.normalized_sample(ns) * scale + lower
    }
}
