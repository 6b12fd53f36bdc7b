//! Dataset adapters
//!
//! Normalizes the two supported input representations — an ordered sequence
//! of points and a flat matrix with a declared observation axis — into the
//! same internal `Point` values, so equivalent inputs produce identical
//! selections.

use crate::core::{Dataset, Point, Result, SelectionError};

/// Observation axis of a flat matrix buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixLayout {
    /// Each consecutive run of `dim` values is one observation
    RowMajor,
    /// Each consecutive run of `n` values is one coordinate across all observations
    ColumnMajor,
}

/// Dataset backed by a flat matrix buffer
///
/// The buffer is interpreted as an `n x dim` matrix whose observation axis
/// is declared by the layout; both layouts yield the same points.
#[derive(Debug, Clone)]
pub struct MatrixDataset {
    data: Vec<f64>,
    n: usize,
    dim: usize,
    layout: MatrixLayout,
}

impl MatrixDataset {
    /// Wrap a flat buffer of `n * dim` values
    pub fn new(data: Vec<f64>, n: usize, dim: usize, layout: MatrixLayout) -> Result<Self> {
        if data.len() != n * dim {
            return Err(SelectionError::InvalidSize(format!(
                "matrix buffer holds {} values, expected {} ({} observations x {} dimensions)",
                data.len(),
                n * dim,
                n,
                dim
            )));
        }
        Ok(Self {
            data,
            n,
            dim,
            layout,
        })
    }

    /// Number of observations
    pub fn n_observations(&self) -> usize {
        self.n
    }

    /// Declared layout of the buffer
    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }
}

impl Dataset for MatrixDataset {
    fn len(&self) -> usize {
        self.n
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn point(&self, i: usize) -> Point {
        assert!(i < self.n, "observation index {} out of bounds", i);
        let coords = match self.layout {
            MatrixLayout::RowMajor => self.data[i * self.dim..(i + 1) * self.dim].to_vec(),
            MatrixLayout::ColumnMajor => (0..self.dim).map(|d| self.data[d * self.n + i]).collect(),
        };
        Point::new(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_matrix() {
        let ds = MatrixDataset::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            3,
            2,
            MatrixLayout::RowMajor,
        )
        .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dim(), 2);
        assert_eq!(ds.point(0), Point::new(vec![1.0, 2.0]));
        assert_eq!(ds.point(2), Point::new(vec![5.0, 6.0]));
    }

    #[test]
    fn test_column_major_matrix() {
        // Same logical matrix as the row-major test, transposed storage
        let ds = MatrixDataset::new(
            vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0],
            3,
            2,
            MatrixLayout::ColumnMajor,
        )
        .unwrap();
        assert_eq!(ds.point(0), Point::new(vec![1.0, 2.0]));
        assert_eq!(ds.point(1), Point::new(vec![3.0, 4.0]));
        assert_eq!(ds.point(2), Point::new(vec![5.0, 6.0]));
    }

    #[test]
    fn test_layouts_normalize_identically() {
        let row = MatrixDataset::new(
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
            4,
            2,
            MatrixLayout::RowMajor,
        )
        .unwrap();
        let col = MatrixDataset::new(
            vec![0.1, 0.3, 0.5, 0.7, 0.2, 0.4, 0.6, 0.8],
            4,
            2,
            MatrixLayout::ColumnMajor,
        )
        .unwrap();
        assert_eq!(row.to_points(), col.to_points());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let result = MatrixDataset::new(vec![1.0, 2.0, 3.0], 2, 2, MatrixLayout::RowMajor);
        assert!(matches!(result, Err(SelectionError::InvalidSize(_))));
    }
}
