use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, s};

/// The FullFactorial design consists of all combinations of evenly spaced
/// levels along each component of the design space.
///
/// By default the number of levels per component is chosen as evenly as
/// possible so that the grid holds at least the requested number of samples;
/// it can also be fixed per component with [`FullFactorial::levels`].
#[derive(Clone, Debug)]
pub struct FullFactorial<F: Float> {
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of a sample x
    xlimits: Array2<F>,
    /// Optional number of levels per component
    levels: Option<Vec<usize>>,
}

impl<F: Float> FullFactorial<F> {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// ```
    /// use uqbox_doe::FullFactorial;
    /// use ndarray::arr2;
    ///
    /// let doe = FullFactorial::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        FullFactorial {
            xlimits: xlimits.to_owned(),
            levels: None,
        }
    }

    /// Fix the number of levels of each component.
    ///
    /// **Panics** if `levels` length differs from the design space dimension
    /// or if a component has zero level.
    pub fn levels(mut self, levels: &[usize]) -> Self {
        if levels.len() != self.xlimits.nrows() {
            panic!("levels must have one entry per design space component");
        }
        if levels.iter().any(|&n| n == 0) {
            panic!("each component must have at least one level");
        }
        self.levels = Some(levels.to_vec());
        self
    }

    /// Distribute at least `ns` points between components, one extra level at
    /// a time to the component which lags most behind an even share.
    fn balanced_levels(&self, ns: usize) -> Vec<usize> {
        let nx = self.xlimits.nrows();
        let mut levels = vec![1; nx];
        while levels.iter().product::<usize>() < ns {
            let total: usize = levels.iter().sum();
            let lagging = (0..nx)
                .min_by(|&a, &b| {
                    let fa = levels[a] as f64 / total as f64;
                    let fb = levels[b] as f64 / total as f64;
                    fa.partial_cmp(&fb).unwrap()
                })
                .unwrap();
            levels[lagging] += 1;
        }
        levels
    }
}

impl<F: Float> SamplingMethod<F> for FullFactorial<F> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let levels = match &self.levels {
            Some(levels) => levels.clone(),
            None => self.balanced_levels(ns),
        };
        let nrows: usize = levels.iter().product();

        let mut doe = Array2::<F>::zeros((nrows, nx));
        let mut block = nrows;
        for j in 0..nx {
            let n = levels[j];
            block /= n;
            let steps: Array1<F> = (0..n)
                .map(|i| {
                    if n > 1 {
                        F::cast(i) / F::cast(n - 1)
                    } else {
                        F::zero()
                    }
                })
                .collect();
            for (row, value) in doe.column_mut(j).iter_mut().zip(
                steps
                    .iter()
                    .flat_map(|&v| std::iter::repeat(v).take(block))
                    .cycle(),
            ) {
                *row = value;
            }
        }
        doe.slice(s![0..ns.min(nrows), ..]).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array};

    #[test]
    fn test_ffact_balanced() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let expected = array![
            [5., 0.],
            [5., 0.5],
            [5., 1.],
            [7.5, 0.],
            [7.5, 0.5],
            [7.5, 1.],
            [10., 0.],
            [10., 0.5],
            [10., 1.],
        ];
        let actual = FullFactorial::new(&xlimits).sample(9);
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-6);
    }

    #[test]
    fn test_ffact_fixed_levels() {
        let xlimits = arr2(&[[0., 1.], [0., 2.]]);
        let expected = array![[0., 0.], [0., 2.], [1., 0.], [1., 2.]];
        let actual = FullFactorial::new(&xlimits).levels(&[2, 2]).sample(4);
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-6);
    }
}
