//! Core type definitions for inducing point selection

use serde::{Deserialize, Serialize};

/// Dense point in a fixed-dimension real-valued space
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// Coordinate values, one per dimension
    pub coords: Vec<f64>,
}

impl Point {
    /// Create a new point from its coordinates
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    /// Dimensionality of the point
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Coordinates as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    /// Squared Euclidean distance to another point
    ///
    /// # Panics
    /// Panics if the dimensions differ; callers go through the dispatcher
    /// which validates dimensions up front.
    pub fn squared_distance(&self, other: &Point) -> f64 {
        debug_assert_eq!(self.dim(), other.dim());
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.squared_distance(other).sqrt()
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl std::ops::Index<usize> for Point {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.coords[i]
    }
}

/// Distance metric used by the clustering-style selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Squared Euclidean distance (the k-means default)
    SquaredEuclidean,
    /// Euclidean distance
    Euclidean,
}

impl Metric {
    /// Distance between two points under this metric
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        match self {
            Metric::SquaredEuclidean => a.squared_distance(b),
            Metric::Euclidean => a.distance(b),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::SquaredEuclidean
    }
}

/// Lazily-expanded Cartesian-product grid
///
/// Stores one coordinate array per dimension and computes any requested
/// point on demand by decomposing a flat index into per-dimension offsets
/// (dimension 0 varies fastest). Memory stays O(M*D) while the logical
/// length is M^D.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyGrid {
    axes: Vec<Vec<f64>>,
}

impl LazyGrid {
    pub(crate) fn new(axes: Vec<Vec<f64>>) -> Self {
        debug_assert!(!axes.is_empty());
        debug_assert!(axes.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { axes }
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    /// Number of grid coordinates along each dimension
    pub fn points_per_dim(&self) -> usize {
        self.axes.first().map_or(0, Vec::len)
    }

    /// Per-dimension coordinate arrays
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Logical number of grid points (points_per_dim ^ dim)
    pub fn len(&self) -> usize {
        self.axes.iter().map(Vec::len).product()
    }

    /// Whether the grid holds no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute the grid point at a flat index without expanding the grid
    pub fn get(&self, index: usize) -> Option<Point> {
        if index >= self.len() {
            return None;
        }
        let mut rem = index;
        let coords = self
            .axes
            .iter()
            .map(|axis| {
                let c = axis[rem % axis.len()];
                rem /= axis.len();
                c
            })
            .collect();
        Some(Point::new(coords))
    }

    /// Iterate over all grid points in flat-index order
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(move |i| self.get(i).unwrap())
    }
}

/// Ordered set of inducing points
///
/// Either a materialized sequence of points or, for the adaptive grid, a
/// lazy Cartesian-product description. Both representations support the
/// same read operations (length, indexed access, iteration) so consumers
/// never need to distinguish them.
#[derive(Clone, Debug)]
pub struct InducingSet {
    repr: Repr,
}

#[derive(Clone, Debug)]
enum Repr {
    Points(Vec<Point>),
    Grid(LazyGrid),
}

impl InducingSet {
    /// Build an inducing set from a materialized point sequence
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            repr: Repr::Points(points),
        }
    }

    pub(crate) fn from_grid(grid: LazyGrid) -> Self {
        Self {
            repr: Repr::Grid(grid),
        }
    }

    /// Number of inducing points
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Points(p) => p.len(),
            Repr::Grid(g) => g.len(),
        }
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the points, or 0 for an empty set
    pub fn dim(&self) -> usize {
        match &self.repr {
            Repr::Points(p) => p.first().map_or(0, Point::dim),
            Repr::Grid(g) => g.dim(),
        }
    }

    /// Point at a given position
    pub fn get(&self, i: usize) -> Option<Point> {
        match &self.repr {
            Repr::Points(p) => p.get(i).cloned(),
            Repr::Grid(g) => g.get(i),
        }
    }

    /// Iterate over all points in order
    pub fn iter(&self) -> Box<dyn Iterator<Item = Point> + '_> {
        match &self.repr {
            Repr::Points(p) => Box::new(p.iter().cloned()),
            Repr::Grid(g) => Box::new(g.iter()),
        }
    }

    /// Borrow the materialized points, if this set is not a lazy grid
    pub fn as_points(&self) -> Option<&[Point]> {
        match &self.repr {
            Repr::Points(p) => Some(p),
            Repr::Grid(_) => None,
        }
    }

    /// Borrow the lazy grid representation, if any
    pub fn as_grid(&self) -> Option<&LazyGrid> {
        match &self.repr {
            Repr::Grid(g) => Some(g),
            Repr::Points(_) => None,
        }
    }

    /// Materialize the full point sequence
    pub fn to_points(&self) -> Vec<Point> {
        self.iter().collect()
    }

    pub(crate) fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match &mut self.repr {
            Repr::Points(p) => Some(p),
            Repr::Grid(_) => None,
        }
    }
}
