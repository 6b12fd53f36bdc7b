//! Greedy ELBO selection
//!
//! Stochastic greedy maximization of the collapsed variational lower bound
//! (Titsias' sparse-GP ELBO) over minibatches: each round draws s unselected
//! candidates, scores the bound with each candidate appended, and commits
//! the best one until m points are selected. Only locally optimal by
//! construction.

use crate::cache::GramCache;
use crate::core::{Point, Result, SelectionError};
use crate::kernel::Kernel;
use log::debug;
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

const LN_2PI: f64 = 1.8378770664093453;

/// Jitter added to the inducing-point Gram block before factorization
const JITTER: f64 = 1e-8;

/// Greedy ELBO selector
///
/// Requires targets, a kernel and an observation noise variance at call
/// time. The result is a subset of the input of size exactly m.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greedy {
    /// Number of inducing points
    pub m: usize,
    /// Minibatch size scored per greedy round
    pub s: usize,
}

impl Greedy {
    /// Create a selector for m points with minibatches of size s
    pub fn new(m: usize, s: usize) -> Self {
        Self { m, s }
    }
}

pub(crate) fn select<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &Greedy,
    points: &[Point],
    targets: &[f64],
    kernel: &dyn Kernel,
    noise: f64,
) -> Result<Vec<Point>> {
    let n = points.len();
    if alg.m == 0 || alg.s == 0 {
        return Err(SelectionError::InvalidSize(
            "m and s must both be positive".into(),
        ));
    }
    if alg.m > n || alg.s > n {
        return Err(SelectionError::InvalidSize(format!(
            "m = {} and s = {} must not exceed the dataset size {}",
            alg.m, alg.s, n
        )));
    }
    if targets.len() != n {
        return Err(SelectionError::DimensionMismatch {
            expected: n,
            actual: targets.len(),
        });
    }
    if !(noise > 0.0) {
        return Err(SelectionError::InvalidSize(format!(
            "noise variance must be positive, got {}",
            noise
        )));
    }

    let y = DVector::from_column_slice(targets);
    let mut cache = GramCache::new(((alg.m + alg.s + 1) * n).max(1024));

    let mut selected: Vec<usize> = Vec::with_capacity(alg.m);
    let mut remaining: Vec<usize> = (0..n).collect();
    while selected.len() < alg.m {
        let batch = index::sample(rng, remaining.len(), alg.s.min(remaining.len()));
        let mut best: Option<(usize, f64)> = None;
        for pos in batch.iter() {
            selected.push(remaining[pos]);
            let score = elbo(&selected, points, &y, kernel, noise, &mut cache);
            selected.pop();
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((pos, score));
            }
        }
        let (pos, score) = best.expect("minibatch is never empty");
        let committed = remaining.swap_remove(pos);
        selected.push(committed);
        debug!(
            "greedy: committed point {} ({}/{}, elbo {:.6})",
            committed,
            selected.len(),
            alg.m,
            score
        );
    }
    debug!("greedy: gram cache hit rate {:.2}", cache.hit_rate());

    Ok(selected.into_iter().map(|i| points[i].clone()).collect())
}

/// Collapsed sparse-GP lower bound for the inducing subset `idx`
///
/// Computed with m x m factorizations only:
/// log|Qnn + σ²I| = log|B| - log|Kmm| + n log σ² with
/// B = Kmm + σ⁻² Kmn Knm, and the quadratic form via the matrix inversion
/// lemma. A subset whose Gram block fails to factorize scores -inf.
fn elbo(
    idx: &[usize],
    points: &[Point],
    y: &DVector<f64>,
    kernel: &dyn Kernel,
    noise: f64,
    cache: &mut GramCache,
) -> f64 {
    let n = points.len();
    let m = idx.len();
    let mut pair = |i: usize, j: usize| {
        cache.get_or_compute(i, j, || {
            if i == j {
                kernel.self_similarity(&points[i])
            } else {
                kernel.compute(&points[i], &points[j])
            }
        })
    };

    let kdiag_sum: f64 = (0..n).map(|i| pair(i, i)).sum();
    if m == 0 {
        // Prior-only model: N(0, σ²I)
        return -0.5 * (n as f64 * (LN_2PI + noise.ln()) + y.norm_squared() / noise)
            - kdiag_sum / (2.0 * noise);
    }

    let kmm = DMatrix::from_fn(m, m, |r, c| pair(idx[r], idx[c]))
        + DMatrix::identity(m, m) * JITTER;
    let kmn = DMatrix::from_fn(m, n, |r, c| pair(idx[r], c));

    let chol_kmm = match Cholesky::new(kmm.clone()) {
        Some(c) => c,
        None => return f64::NEG_INFINITY,
    };
    let b = &kmm + (&kmn * kmn.transpose()) / noise;
    let chol_b = match Cholesky::new(b) {
        Some(c) => c,
        None => return f64::NEG_INFINITY,
    };

    let logdet = log_det(&chol_b) - log_det(&chol_kmm) + n as f64 * noise.ln();
    let kmn_y = &kmn * y;
    let quad = (y.norm_squared() - kmn_y.dot(&chol_b.solve(&kmn_y)) / noise) / noise;
    let trace_qnn = kmn.component_mul(&chol_kmm.solve(&kmn)).sum();

    -0.5 * (n as f64 * LN_2PI + logdet + quad) - (kdiag_sum - trace_qnn) / (2.0 * noise)
}

fn log_det(chol: &Cholesky<f64, nalgebra::Dyn>) -> f64 {
    2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::RBFKernel;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn sine_data(n: usize) -> (Vec<Point>, Vec<f64>) {
        let points: Vec<Point> = (0..n)
            .map(|i| Point::new(vec![i as f64 / n as f64 * 6.0]))
            .collect();
        let targets = points.iter().map(|p| p[0].sin()).collect();
        (points, targets)
    }

    #[test]
    fn test_greedy_output_size_and_membership() {
        let (points, targets) = sine_data(25);
        let kernel = RBFKernel::new(1.0);
        let mut rng = XorShiftRng::seed_from_u64(4);
        let z = select(&mut rng, &Greedy::new(6, 8), &points, &targets, &kernel, 0.1).unwrap();
        assert_eq!(z.len(), 6);
        for p in &z {
            assert!(points.contains(p));
        }
    }

    #[test]
    fn test_greedy_size_validation() {
        let (points, targets) = sine_data(10);
        let kernel = RBFKernel::new(1.0);
        let mut rng = XorShiftRng::seed_from_u64(4);
        assert!(matches!(
            select(&mut rng, &Greedy::new(11, 4), &points, &targets, &kernel, 0.1),
            Err(SelectionError::InvalidSize(_))
        ));
        assert!(matches!(
            select(&mut rng, &Greedy::new(4, 11), &points, &targets, &kernel, 0.1),
            Err(SelectionError::InvalidSize(_))
        ));
        assert!(matches!(
            select(&mut rng, &Greedy::new(4, 4), &points, &targets, &kernel, 0.0),
            Err(SelectionError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_greedy_target_length_checked() {
        let (points, _) = sine_data(10);
        let short = vec![0.0; 9];
        let kernel = RBFKernel::new(1.0);
        let mut rng = XorShiftRng::seed_from_u64(4);
        assert!(matches!(
            select(&mut rng, &Greedy::new(3, 4), &points, &short, &kernel, 0.1),
            Err(SelectionError::DimensionMismatch {
                expected: 10,
                actual: 9
            })
        ));
    }

    #[test]
    fn test_elbo_improves_with_more_inducing_points() {
        let (points, targets) = sine_data(20);
        let kernel = RBFKernel::new(1.0);
        let y = DVector::from_column_slice(&targets);
        let mut cache = GramCache::new(4096);
        let empty = elbo(&[], &points, &y, &kernel, 0.1, &mut cache);
        let one = elbo(&[0], &points, &y, &kernel, 0.1, &mut cache);
        let spread = elbo(&[0, 7, 14], &points, &y, &kernel, 0.1, &mut cache);
        assert!(one > empty);
        assert!(spread > one);
    }

    #[test]
    fn test_elbo_matches_dense_reference() {
        let (points, targets) = sine_data(6);
        let kernel = RBFKernel::new(1.0);
        let noise = 0.2;
        let y = DVector::from_column_slice(&targets);
        let mut cache = GramCache::new(1024);
        let idx = [1usize, 4];
        let fast = elbo(&idx, &points, &y, &kernel, noise, &mut cache);

        // Dense reference over the full n x n covariance:
        // L = log N(y | 0, Qnn + σ²I) − tr(Knn − Qnn)/(2σ²)
        let n = points.len();
        let z: Vec<Point> = idx.iter().map(|&i| points[i].clone()).collect();
        let kmm = kernel.gram(&z) + DMatrix::identity(2, 2) * JITTER;
        let kmn = kernel.cross_gram(&z, &points);
        let qnn = kmn.transpose() * kmm.try_inverse().unwrap() * &kmn;
        let cov = &qnn + DMatrix::identity(n, n) * noise;
        let chol = Cholesky::new(cov).unwrap();
        let logdet = 2.0 * chol.l().diagonal().iter().map(|d| d.ln()).sum::<f64>();
        let quad = y.dot(&chol.solve(&y));
        let trace = (kernel.gram(&points) - qnn).trace();
        let dense = -0.5 * (n as f64 * LN_2PI + logdet + quad) - trace / (2.0 * noise);

        assert_relative_eq!(fast, dense, epsilon = 1e-6);
    }

    #[test]
    fn test_elbo_degenerate_subset_is_rejected_by_score() {
        let (points, targets) = sine_data(12);
        let kernel = RBFKernel::new(1.0);
        let y = DVector::from_column_slice(&targets);
        let mut cache = GramCache::new(4096);
        let distinct = elbo(&[0, 6], &points, &y, &kernel, 0.1, &mut cache);
        let duplicated = elbo(&[0, 0], &points, &y, &kernel, 0.1, &mut cache);
        assert!(distinct > duplicated);
    }
}
