//! Shared numeric helpers for the selector implementations

use crate::core::{Metric, Point};
use crate::kernel::Kernel;
use rand::Rng;

/// Find the closest member of `centers` to `x` under the given metric
///
/// Returns the index of the nearest center and the distance to it.
///
/// # Panics
/// Panics if `centers` is empty.
pub fn find_nearest_center(x: &Point, centers: &[Point], metric: Metric) -> (usize, f64) {
    assert!(!centers.is_empty(), "no centers to search");
    let mut best = 0;
    let mut best_dist = metric.distance(x, &centers[0]);
    for (i, c) in centers.iter().enumerate().skip(1) {
        let d = metric.distance(x, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    (best, best_dist)
}

/// Kernel-induced distance between two points
///
/// d(x, z) = sqrt(K(x,x) + K(z,z) - 2 K(x,z)), clamped at zero against
/// round-off from near-identical points.
pub fn kernel_distance(kernel: &dyn Kernel, x: &Point, z: &Point) -> f64 {
    let d2 = kernel.self_similarity(x) + kernel.self_similarity(z) - 2.0 * kernel.compute(x, z);
    d2.max(0.0).sqrt()
}

/// Nearest member of `centers` to `x` in the kernel-induced metric when a
/// kernel is supplied, Euclidean distance otherwise
pub fn find_nearest_center_kernelized(
    x: &Point,
    centers: &[Point],
    kernel: Option<&dyn Kernel>,
) -> (usize, f64) {
    match kernel {
        None => find_nearest_center(x, centers, Metric::Euclidean),
        Some(k) => {
            assert!(!centers.is_empty(), "no centers to search");
            let mut best = 0;
            let mut best_dist = kernel_distance(k, x, &centers[0]);
            for (i, c) in centers.iter().enumerate().skip(1) {
                let d = kernel_distance(k, x, c);
                if d < best_dist {
                    best_dist = d;
                    best = i;
                }
            }
            (best, best_dist)
        }
    }
}

/// `n` regularly spaced coordinates covering [lo, hi]
///
/// A single-coordinate grid collapses to the interval midpoint; a
/// degenerate interval (lo == hi) repeats that value.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    assert!(n > 0);
    if n == 1 {
        return vec![(lo + hi) / 2.0];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

/// Coordinate-wise mean of the points selected by `indices`
///
/// # Panics
/// Panics if `indices` is empty.
pub fn centroid(points: &[Point], indices: &[usize]) -> Point {
    assert!(!indices.is_empty(), "centroid of an empty set");
    let dim = points[indices[0]].dim();
    let mut coords = vec![0.0; dim];
    for &i in indices {
        for (c, v) in coords.iter_mut().zip(points[i].coords.iter()) {
            *c += v;
        }
    }
    let count = indices.len() as f64;
    for c in coords.iter_mut() {
        *c /= count;
    }
    Point::new(coords)
}

/// Draw one index proportionally to the given non-negative weights
///
/// Falls back to a uniform draw when every weight is zero.
pub fn sample_weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return rng.gen_range(0..weights.len());
    }
    let mut target = rng.gen::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        target -= w;
        if target <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}
