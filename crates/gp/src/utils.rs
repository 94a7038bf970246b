use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

/// A data matrix centered and scaled to unit standard deviation columnwise.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedData<F: Float> {
    /// Normalized values
    pub data: Array2<F>,
    /// Columnwise means of the original data
    pub mean: Array1<F>,
    /// Columnwise standard deviations of the original data
    pub std: Array1<F>,
}

impl<F: Float> NormalizedData<F> {
    /// Constant columns get a unit scale to avoid division by zero.
    pub fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> NormalizedData<F> {
        let mean = x.mean_axis(Axis(0)).unwrap();
        let std = x
            .std_axis(Axis(0), F::one())
            .mapv(|v| if v == F::zero() { F::one() } else { v });
        NormalizedData {
            data: (x - &mean) / &std,
            mean,
            std,
        }
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }
}

/// Componentwise differences between the distinct pairs of rows of a
/// training matrix, kept together with the pair indices so that the
/// correlation matrix can be reassembled.
#[derive(Debug)]
pub(crate) struct DiffMatrix<F: Float> {
    /// Differences of the n * (n - 1) / 2 pairs (i, j) with i < j, (n_pairs, nx)
    pub d: Array2<F>,
    /// Pair indices (n_pairs, 2)
    pub d_indices: Array2<usize>,
    /// Number of rows of the training matrix
    pub n_obs: usize,
}

impl<F: Float> DiffMatrix<F> {
    pub fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> DiffMatrix<F> {
        let (n_obs, nx) = x.dim();
        let n_pairs = n_obs * (n_obs - 1) / 2;
        let mut d = Array2::zeros((n_pairs, nx));
        let mut d_indices = Array2::zeros((n_pairs, 2));
        let mut k = 0;
        for i in 0..n_obs {
            for j in (i + 1)..n_obs {
                let diff = &x.row(i) - &x.row(j);
                d.row_mut(k).assign(&diff);
                d_indices[[k, 0]] = i;
                d_indices[[k, 1]] = j;
                k += 1;
            }
        }
        DiffMatrix {
            d,
            d_indices,
            n_obs,
        }
    }
}

/// Componentwise differences between all the pairs of rows of `a` and `b`,
/// returned as a (a.nrows() * b.nrows(), nx) matrix in row-major pair order.
pub(crate) fn pairwise_differences<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix2>,
    b: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    let (na, nx) = a.dim();
    let nb = b.nrows();
    let mut d = Array2::zeros((na * nb, nx));
    for i in 0..na {
        for j in 0..nb {
            d.row_mut(i * nb + j).assign(&(&a.row(i) - &b.row(j)));
        }
    }
    d
}
