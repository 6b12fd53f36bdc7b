//! Random subset selection

use crate::core::{Point, Result, SelectionError};
use crate::utils::sample_weighted_index;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform or weighted sampling of m points from the dataset without
/// replacement
///
/// The result is always a subset of the input. With a fixed random source
/// the selection is fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSubset {
    /// Number of inducing points to draw
    pub m: usize,
}

impl RandomSubset {
    /// Create a selector drawing m points
    pub fn new(m: usize) -> Self {
        Self { m }
    }
}

pub(crate) fn select<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &RandomSubset,
    points: &[Point],
    weights: Option<&[f64]>,
) -> Result<Vec<Point>> {
    let n = points.len();
    if alg.m == 0 {
        return Err(SelectionError::InvalidSize(
            "cannot select an empty subset (m = 0)".into(),
        ));
    }
    if alg.m > n {
        return Err(SelectionError::InvalidSize(format!(
            "requested {} points from a dataset of {}",
            alg.m, n
        )));
    }

    let indices = match weights {
        None => index::sample(rng, n, alg.m).into_vec(),
        Some(w) => {
            if w.len() != n {
                return Err(SelectionError::DimensionMismatch {
                    expected: n,
                    actual: w.len(),
                });
            }
            if w.iter().any(|&x| x < 0.0 || !x.is_finite()) {
                return Err(SelectionError::InvalidSize(
                    "weights must be non-negative and finite".into(),
                ));
            }
            // Draw one index at a time, zeroing the weight of each pick
            let mut remaining = w.to_vec();
            let mut picked = Vec::with_capacity(alg.m);
            for _ in 0..alg.m {
                let idx = sample_weighted_index(rng, &remaining);
                remaining[idx] = 0.0;
                picked.push(idx);
            }
            picked
        }
    };

    Ok(indices.into_iter().map(|i| points[i].clone()).collect())
}
