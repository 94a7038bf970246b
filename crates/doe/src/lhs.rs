use std::sync::{Arc, RwLock};

use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use rand_xoshiro::Xoshiro256Plus;

/// Kinds of Latin Hypercube designs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LhsKind {
    /// Sample is drawn uniformly within its stratum
    #[default]
    Classic,
    /// Sample is centered within its stratum
    Centered,
}

type RngRef<R> = Arc<RwLock<R>>;

/// The Latin Hypercube design divides each dimension in `ns` strata
/// and draws one sample per stratum so that every one-dimensional
/// projection of the design is evenly spread.
#[derive(Clone, Debug)]
pub struct Lhs<F: Float, R: Rng> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// The requested kind of LHS
    kind: LhsKind,
    /// Random generator used for reproducibility
    rng: RngRef<R>,
}

impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// ```
    /// use uqbox_doe::Lhs;
    /// use ndarray::arr2;
    ///
    /// let doe = Lhs::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng> Lhs<F, R> {
    /// Constructor given a design space and a random generator for reproducibility
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, rng: R) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::default(),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Set the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            rng: Arc::new(RwLock::new(rng)),
        }
    }
}

impl<F: Float, R: Rng> SamplingMethod<F> for Lhs<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut rng = self.rng.write().unwrap();
        let nx = self.xlimits.nrows();

        let jitter = match self.kind {
            LhsKind::Classic => {
                Array::random_using((ns, nx), Uniform::new(0., 1.), &mut *rng).mapv(|v| F::cast(v))
            }
            LhsKind::Centered => Array2::from_elem((ns, nx), F::cast(0.5)),
        };

        let mut doe = Array2::<F>::zeros((ns, nx));
        let mut strata: Vec<usize> = (0..ns).collect();
        for j in 0..nx {
            strata.shuffle(&mut *rng);
            let mut col = doe.index_axis_mut(Axis(1), j);
            for i in 0..ns {
                col[i] = (F::cast(strata[i]) + jitter[[i, j]]) / F::cast(ns);
            }
        }
        doe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_lhs_stratification() {
        let xlimits = arr2(&[[0., 1.], [10., 20.]]);
        let ns = 17;
        let doe = Lhs::new_with_rng(&xlimits, Xoshiro256Plus::seed_from_u64(7)).sample(ns);
        // each one-dimensional projection hits every stratum exactly once
        for j in 0..2 {
            let (lo, up) = (xlimits[[j, 0]], xlimits[[j, 1]]);
            let mut hits = vec![0; ns];
            for i in 0..ns {
                let u = (doe[[i, j]] - lo) / (up - lo);
                hits[(u * ns as f64).floor().min(ns as f64 - 1.) as usize] += 1;
            }
            assert!(hits.iter().all(|&h| h == 1));
        }
    }

    #[test]
    fn test_centered_lhs() {
        let xlimits = arr2(&[[0., 1.]]);
        let ns = 5;
        let doe = Lhs::new_with_rng(&xlimits, Xoshiro256Plus::seed_from_u64(3))
            .kind(LhsKind::Centered)
            .sample(ns);
        let mut vals: Vec<f64> = doe.column(0).to_vec();
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(vals, vec![0.1, 0.3, 0.5, 0.7, 0.9]);
    }
}
