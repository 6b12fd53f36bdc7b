//! Core traits for inducing point selection

use crate::core::Point;

/// Dataset abstraction over heterogeneous input representations
///
/// Both the ordered-sequence and matrix adapters normalize to the same
/// `Point` values, so every selector sees one internal representation.
pub trait Dataset: Send + Sync {
    /// Number of observations in the dataset
    fn len(&self) -> usize;

    /// Number of coordinates per observation (dimensionality)
    fn dim(&self) -> usize;

    /// Get a single observation by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn point(&self, i: usize) -> Point;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize all observations in order
    fn to_points(&self) -> Vec<Point> {
        (0..self.len()).map(|i| self.point(i)).collect()
    }
}

impl Dataset for [Point] {
    fn len(&self) -> usize {
        <[Point]>::len(self)
    }

    fn dim(&self) -> usize {
        self.first().map_or(0, Point::dim)
    }

    fn point(&self, i: usize) -> Point {
        self[i].clone()
    }
}

impl Dataset for Vec<Point> {
    fn len(&self) -> usize {
        <[Point]>::len(self)
    }

    fn dim(&self) -> usize {
        self.first().map_or(0, Point::dim)
    }

    fn point(&self, i: usize) -> Point {
        self[i].clone()
    }
}
