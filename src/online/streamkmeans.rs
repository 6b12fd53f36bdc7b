//! Streaming k-means (facility-threshold variant)
//!
//! Maintains m_target running centroids against a stream. A new point
//! either opens a new centroid (its squared distance to the nearest
//! centroid exceeds the facility threshold) or merges into the nearest one
//! by running mean. Whenever the set grows past the target, the
//! lowest-count centroid is merged into its nearest neighbor and the
//! facility threshold doubles, so openings become progressively rarer.

use crate::core::{Metric, Point, Result, SelectionError};
use crate::utils::find_nearest_center;
use log::debug;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Streaming k-means configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamKmeans {
    /// Number of maintained centroids
    pub m_target: usize,
}

impl StreamKmeans {
    /// Create a streaming selector maintaining m_target centroids
    pub fn new(m_target: usize) -> Self {
        Self { m_target }
    }
}

/// Mutable per-centroid bookkeeping carried between updates
pub(crate) struct StreamState {
    pub counts: Vec<f64>,
    pub facility: f64,
}

/// Seed from the first batch and absorb its remaining points
pub(crate) fn init<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &StreamKmeans,
    points: &[Point],
) -> Result<(Vec<Point>, StreamState)> {
    let n = points.len();
    if alg.m_target == 0 {
        return Err(SelectionError::InvalidSize(
            "cannot maintain zero centroids".into(),
        ));
    }
    if n < alg.m_target {
        return Err(SelectionError::InvalidSize(format!(
            "first batch holds {} points but {} centroids are required for seeding",
            n, alg.m_target
        )));
    }

    let seed_indices = index::sample(rng, n, alg.m_target).into_vec();
    let mut centroids: Vec<Point> = seed_indices.iter().map(|&i| points[i].clone()).collect();

    // Facility threshold: half the smallest pairwise squared separation of
    // the seeds, floored so identical seeds do not freeze the stream
    let mut min_sq = f64::INFINITY;
    for i in 0..centroids.len() {
        for j in (i + 1)..centroids.len() {
            min_sq = min_sq.min(centroids[i].squared_distance(&centroids[j]));
        }
    }
    let facility = if min_sq.is_finite() {
        (min_sq / 2.0).max(f64::EPSILON)
    } else {
        f64::EPSILON
    };

    let mut state = StreamState {
        counts: vec![1.0; alg.m_target],
        facility,
    };
    for (i, p) in points.iter().enumerate() {
        if !seed_indices.contains(&i) {
            absorb(alg, &mut centroids, &mut state, p);
        }
    }
    Ok((centroids, state))
}

/// Absorb a batch into the maintained centroids, in place
pub(crate) fn update(
    alg: &StreamKmeans,
    centroids: &mut Vec<Point>,
    state: &mut StreamState,
    batch: &[Point],
) {
    for p in batch {
        absorb(alg, centroids, state, p);
    }
}

fn absorb(alg: &StreamKmeans, centroids: &mut Vec<Point>, state: &mut StreamState, x: &Point) {
    let (nearest, d2) = find_nearest_center(x, centroids, Metric::SquaredEuclidean);
    if d2 > state.facility {
        centroids.push(x.clone());
        state.counts.push(1.0);
        if centroids.len() > alg.m_target {
            merge_overflow(centroids, state);
        }
    } else {
        state.counts[nearest] += 1.0;
        let inv = 1.0 / state.counts[nearest];
        for (c, v) in centroids[nearest].coords.iter_mut().zip(x.coords.iter()) {
            *c += (v - *c) * inv;
        }
    }
}

/// Merge the lowest-count centroid into its nearest neighbor by weighted
/// mean and double the facility threshold
fn merge_overflow(centroids: &mut Vec<Point>, state: &mut StreamState) {
    let victim = state
        .counts
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();

    let victim_point = centroids[victim].clone();
    let victim_count = state.counts[victim];
    let target = centroids
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != victim)
        .map(|(i, c)| (i, victim_point.squared_distance(c)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();

    let total = state.counts[target] + victim_count;
    let w = victim_count / total;
    for (c, v) in centroids[target]
        .coords
        .iter_mut()
        .zip(victim_point.coords.iter())
    {
        *c += (v - *c) * w;
    }
    state.counts[target] = total;

    centroids.remove(victim);
    state.counts.remove(victim);
    state.facility *= 2.0;
    debug!(
        "streamkmeans: merged centroid {} into {}, facility now {:.6}",
        victim, target, state.facility
    );
}
