//! Adaptive uniform grid
//!
//! Maintains a regularly spaced grid of m coordinates per dimension over
//! the running bounding box of the observed data. Updates extend the box to
//! cover new extrema and respace the axes; the grid itself stays a lazy
//! Cartesian product (see `core::types::LazyGrid`), so memory is O(m * D)
//! while the logical set holds m^D points.

use crate::core::{LazyGrid, Point, Result, SelectionError};
use crate::utils::linspace;
use serde::{Deserialize, Serialize};

/// Adaptive uniform grid with m points per dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniGrid {
    /// Grid coordinates per dimension (total size m^D)
    pub m: usize,
}

impl UniGrid {
    /// Create a grid selector with m points per dimension
    ///
    /// # Panics
    /// Panics if m is zero
    pub fn new(m: usize) -> Self {
        assert!(m > 0, "Grid resolution must be positive");
        Self { m }
    }
}

/// Bounding box of a batch, per dimension
pub(crate) fn bounding_box(points: &[Point]) -> (Vec<f64>, Vec<f64>) {
    let dim = points[0].dim();
    let mut lo = vec![f64::INFINITY; dim];
    let mut hi = vec![f64::NEG_INFINITY; dim];
    for p in points {
        for d in 0..dim {
            lo[d] = lo[d].min(p[d]);
            hi[d] = hi[d].max(p[d]);
        }
    }
    (lo, hi)
}

pub(crate) fn build_grid(alg: &UniGrid, lo: &[f64], hi: &[f64]) -> LazyGrid {
    let axes = lo
        .iter()
        .zip(hi.iter())
        .map(|(&l, &h)| linspace(l, h, alg.m))
        .collect();
    LazyGrid::new(axes)
}

/// Initialize the grid and its bounding-box state from a first batch
pub(crate) fn init(alg: &UniGrid, points: &[Point]) -> Result<(LazyGrid, Vec<f64>, Vec<f64>)> {
    if points.is_empty() {
        return Err(SelectionError::InvalidSize("empty dataset".into()));
    }
    let (lo, hi) = bounding_box(points);
    let grid = build_grid(alg, &lo, &hi);
    Ok((grid, lo, hi))
}

/// Extend the bounding box with a batch's extrema and rebuild the axes
pub(crate) fn update(
    alg: &UniGrid,
    lo: &mut Vec<f64>,
    hi: &mut Vec<f64>,
    batch: &[Point],
) -> LazyGrid {
    for p in batch {
        for d in 0..lo.len() {
            lo[d] = lo[d].min(p[d]);
            hi[d] = hi[d].max(p[d]);
        }
    }
    build_grid(alg, lo, hi)
}
