//! Web-scale mini-batch k-means
//!
//! Single-point stochastic centroid updates with a per-centroid learning
//! rate that decays as the inverse of its assignment count (Sculley's
//! mini-batch k-means rule). The centroid set is seeded from the first
//! batch and keeps a fixed size m thereafter.

use crate::core::{Metric, Point, Result, SelectionError};
use crate::utils::find_nearest_center;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Web-scale mini-batch k-means configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webscale {
    /// Number of maintained centroids
    pub m: usize,
}

impl Webscale {
    /// Create a selector maintaining m centroids
    pub fn new(m: usize) -> Self {
        Self { m }
    }
}

/// Seed m centroids from the first batch, then apply the per-point update
/// rule to the whole batch
pub(crate) fn init<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &Webscale,
    points: &[Point],
) -> Result<(Vec<Point>, Vec<u64>)> {
    let n = points.len();
    if alg.m == 0 {
        return Err(SelectionError::InvalidSize(
            "cannot maintain zero centroids".into(),
        ));
    }
    if n < alg.m {
        return Err(SelectionError::InvalidSize(format!(
            "first batch holds {} points but {} centroids are required for seeding",
            n, alg.m
        )));
    }

    let mut centroids: Vec<Point> = index::sample(rng, n, alg.m)
        .into_iter()
        .map(|i| points[i].clone())
        .collect();
    let mut counts = vec![0u64; alg.m];
    update(&mut centroids, &mut counts, points);
    Ok((centroids, counts))
}

/// Per-point gradient-style centroid updates, in place
pub(crate) fn update(centroids: &mut [Point], counts: &mut [u64], batch: &[Point]) {
    for x in batch {
        let (nearest, _) = find_nearest_center(x, centroids, Metric::SquaredEuclidean);
        counts[nearest] += 1;
        let lr = 1.0 / counts[nearest] as f64;
        for (c, v) in centroids[nearest].coords.iter_mut().zip(x.coords.iter()) {
            *c += (v - *c) * lr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn blobs() -> Vec<Point> {
        let mut points = Vec::new();
        for i in 0..8 {
            let jitter = i as f64 * 0.02;
            points.push(Point::new(vec![jitter, jitter]));
            points.push(Point::new(vec![5.0 + jitter, 5.0 - jitter]));
        }
        points
    }

    #[test]
    fn test_init_fixed_size() {
        let mut rng = XorShiftRng::seed_from_u64(5);
        let (centroids, counts) = init(&mut rng, &Webscale::new(4), &blobs()).unwrap();
        assert_eq!(centroids.len(), 4);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.iter().sum::<u64>(), 16);
    }

    #[test]
    fn test_small_first_batch_rejected() {
        let mut rng = XorShiftRng::seed_from_u64(5);
        let result = init(&mut rng, &Webscale::new(20), &blobs());
        assert!(matches!(result, Err(SelectionError::InvalidSize(_))));
    }

    #[test]
    fn test_learning_rate_decays_with_count() {
        let mut centroids = vec![Point::new(vec![0.0])];
        let mut counts = vec![0u64];
        // First assignment moves the centroid all the way to the point
        update(&mut centroids, &mut counts, &[Point::new(vec![2.0])]);
        assert_eq!(centroids[0], Point::new(vec![2.0]));
        // Second assignment moves it only half-way
        update(&mut centroids, &mut counts, &[Point::new(vec![4.0])]);
        assert_eq!(centroids[0], Point::new(vec![3.0]));
        assert_eq!(counts[0], 2);
    }

    #[test]
    fn test_centroids_drift_towards_stream() {
        let alg = Webscale::new(2);
        let mut rng = XorShiftRng::seed_from_u64(15);
        let (mut centroids, mut counts) = init(&mut rng, &alg, &blobs()).unwrap();
        let stream: Vec<Point> = (0..50)
            .map(|i| Point::new(vec![5.0 + (i % 3) as f64 * 0.01, 5.0]))
            .collect();
        update(&mut centroids, &mut counts, &stream);
        let near_stream = centroids
            .iter()
            .map(|c| c.distance(&Point::new(vec![5.0, 5.0])))
            .fold(f64::INFINITY, f64::min);
        assert!(near_stream < 1.0);
        assert_eq!(centroids.len(), 2);
    }
}
