//! Kernel oracle trait definition

use crate::core::Point;
use nalgebra::DMatrix;

/// Kernel similarity oracle
///
/// A kernel K(x, y) must be symmetric and yield a positive-semidefinite
/// Gram matrix on any finite point set for the DPP-family selectors to be
/// correct. The oracle is supplied by the caller; violations of the PSD
/// contract are a caller error and are not detected defensively.
pub trait Kernel: Send + Sync {
    /// Compute the similarity K(x, y)
    fn compute(&self, x: &Point, y: &Point) -> f64;

    /// Similarity of a point with itself, K(x, x)
    ///
    /// Kernels with a constant diagonal (e.g. RBF) can override this to
    /// skip the pairwise computation.
    fn self_similarity(&self, x: &Point) -> f64 {
        self.compute(x, x)
    }

    /// Gram matrix over a point set, exploiting symmetry
    fn gram(&self, points: &[Point]) -> DMatrix<f64> {
        let n = points.len();
        let mut gram = DMatrix::zeros(n, n);
        for i in 0..n {
            gram[(i, i)] = self.self_similarity(&points[i]);
            for j in (i + 1)..n {
                let value = self.compute(&points[i], &points[j]);
                gram[(i, j)] = value;
                gram[(j, i)] = value;
            }
        }
        gram
    }

    /// Rectangular similarity block K(a_i, b_j)
    fn cross_gram(&self, a: &[Point], b: &[Point]) -> DMatrix<f64> {
        DMatrix::from_fn(a.len(), b.len(), |i, j| self.compute(&a[i], &b[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DotKernel;

    impl Kernel for DotKernel {
        fn compute(&self, x: &Point, y: &Point) -> f64 {
            x.coords.iter().zip(y.coords.iter()).map(|(a, b)| a * b).sum()
        }
    }

    #[test]
    fn test_gram_is_symmetric() {
        let points = vec![
            Point::new(vec![1.0, 0.0]),
            Point::new(vec![0.5, 0.5]),
            Point::new(vec![0.0, 2.0]),
        ];
        let gram = DotKernel.gram(&points);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(gram[(i, j)], gram[(j, i)]);
            }
        }
        assert_eq!(gram[(0, 0)], 1.0);
        assert_eq!(gram[(0, 2)], 0.0);
    }

    #[test]
    fn test_cross_gram_shape() {
        let a = vec![Point::new(vec![1.0]), Point::new(vec![2.0])];
        let b = vec![
            Point::new(vec![3.0]),
            Point::new(vec![4.0]),
            Point::new(vec![5.0]),
        ];
        let block = DotKernel.cross_gram(&a, &b);
        assert_eq!(block.nrows(), 2);
        assert_eq!(block.ncols(), 3);
        assert_eq!(block[(1, 2)], 10.0);
    }
}
