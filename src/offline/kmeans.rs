//! k-means centroid selection
//!
//! Seeding follows the Markov-chain approximation of k-means++ (one short
//! Metropolis chain per centroid over distance-squared ratios), which keeps
//! the seeding near-linear in the dataset size instead of the O(N*M) exact
//! k-means++ cost. Refinement is plain Lloyd iteration under the configured
//! metric.

use crate::core::{Metric, Point, Result, SelectionError};
use crate::utils::find_nearest_center;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// k-means selector producing m synthesized centroids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// Number of centroids
    pub m: usize,
    /// Metric used for assignment during seeding and refinement
    pub metric: Metric,
    /// Length of the Metropolis chain run per seeded centroid
    pub n_markov: usize,
    /// Convergence tolerance on centroid movement
    pub tol: f64,
    /// Upper bound on Lloyd iterations
    pub max_iter: usize,
}

impl KMeans {
    /// Create a selector with m centroids and default hyperparameters
    /// (squared-Euclidean metric, 10 Markov steps, tol = 1e-3)
    pub fn new(m: usize) -> Self {
        Self {
            m,
            metric: Metric::default(),
            n_markov: 10,
            tol: 1e-3,
            max_iter: 100,
        }
    }

    /// Set the assignment metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the Markov chain length used during seeding
    pub fn with_n_markov(mut self, n_markov: usize) -> Self {
        assert!(n_markov > 0, "chain length must be positive");
        self.n_markov = n_markov;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        assert!(tol > 0.0, "tolerance must be positive");
        self.tol = tol;
        self
    }

    /// Set the Lloyd iteration cap
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        assert!(max_iter > 0, "iteration cap must be positive");
        self.max_iter = max_iter;
        self
    }
}

pub(crate) fn select<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &KMeans,
    points: &[Point],
) -> Result<Vec<Point>> {
    let n = points.len();
    if alg.m == 0 {
        return Err(SelectionError::InvalidSize(
            "cannot select an empty subset (m = 0)".into(),
        ));
    }
    if alg.m > n {
        return Err(SelectionError::InvalidSize(format!(
            "requested {} centroids from a dataset of {}",
            alg.m, n
        )));
    }

    let seeds = markov_seeding(rng, points, alg.m, alg.n_markov);
    Ok(lloyd(points, seeds, alg.metric, alg.tol, alg.max_iter))
}

/// Markov-chain k-means++ seeding
///
/// The first centroid is drawn uniformly. Each further centroid runs a
/// Metropolis chain of the configured length where a uniformly proposed
/// candidate replaces the current one with probability
/// min(1, d²(candidate) / d²(current)), which approximates the
/// distance-squared-proportional draw of exact k-means++.
fn markov_seeding<R: Rng + ?Sized>(
    rng: &mut R,
    points: &[Point],
    m: usize,
    n_markov: usize,
) -> Vec<Point> {
    let n = points.len();
    let mut centroids: Vec<Point> = Vec::with_capacity(m);
    centroids.push(points[rng.gen_range(0..n)].clone());

    let cost = |p: &Point, centroids: &[Point]| -> f64 {
        centroids
            .iter()
            .map(|c| p.squared_distance(c))
            .fold(f64::INFINITY, f64::min)
    };

    while centroids.len() < m {
        let mut current = rng.gen_range(0..n);
        let mut current_cost = cost(&points[current], &centroids);
        for _ in 0..n_markov {
            let candidate = rng.gen_range(0..n);
            let candidate_cost = cost(&points[candidate], &centroids);
            let accept = if current_cost <= 0.0 {
                // chain sits on a point duplicating a centroid, move freely
                true
            } else {
                rng.gen::<f64>() < (candidate_cost / current_cost).min(1.0)
            };
            if accept {
                current = candidate;
                current_cost = candidate_cost;
            }
        }
        centroids.push(points[current].clone());
    }
    centroids
}

/// Lloyd refinement until centroid movement drops below tol
///
/// An empty cluster retains its previous centroid rather than producing an
/// undefined mean.
pub(crate) fn lloyd(
    points: &[Point],
    mut centroids: Vec<Point>,
    metric: Metric,
    tol: f64,
    max_iter: usize,
) -> Vec<Point> {
    let dim = points[0].dim();
    for iter in 0..max_iter {
        let mut sums = vec![vec![0.0; dim]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for p in points {
            let (idx, _) = find_nearest_center(p, &centroids, metric);
            counts[idx] += 1;
            for (s, v) in sums[idx].iter_mut().zip(p.coords.iter()) {
                *s += v;
            }
        }

        let mut movement = 0.0_f64;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            let mean = Point::new(
                sums[i]
                    .iter()
                    .map(|s| s / counts[i] as f64)
                    .collect::<Vec<f64>>(),
            );
            movement = movement.max(centroid.distance(&mean));
            *centroid = mean;
        }

        if movement < tol {
            debug!("k-means converged after {} iterations", iter + 1);
            return centroids;
        }
    }
    debug!("k-means stopped at the {} iteration cap", max_iter);
    centroids
}
