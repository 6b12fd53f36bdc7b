//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::Point;
use crate::kernel::Kernel;

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The default oracle for the DPP-family selectors in tests and examples.
/// The gamma parameter controls the "reach" of each point:
/// - High gamma: only close points count as similar
/// - Low gamma: distant points still count as similar
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Create RBF kernel with gamma = 1.0 / dim
    ///
    /// A common default choice that scales inversely with dimensionality.
    pub fn with_auto_gamma(dim: usize) -> Self {
        assert!(dim > 0, "Dimension must be positive");
        Self::new(1.0 / dim as f64)
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &Point, y: &Point) -> f64 {
        (-self.gamma * x.squared_distance(y)).exp()
    }

    fn self_similarity(&self, _x: &Point) -> f64 {
        // exp(0) regardless of the point
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbf_kernel_creation() {
        let kernel = RBFKernel::new(0.5);
        assert_eq!(kernel.gamma(), 0.5);

        let kernel_auto = RBFKernel::with_auto_gamma(10);
        assert_eq!(kernel_auto.gamma(), 0.1);

        let kernel_default = RBFKernel::default();
        assert_eq!(kernel_default.gamma(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        RBFKernel::new(-0.5);
    }

    #[test]
    fn test_rbf_kernel_identical_points() {
        let kernel = RBFKernel::new(1.0);
        let x = Point::new(vec![1.0, 2.0, 3.0]);
        assert!((kernel.compute(&x, &x) - 1.0).abs() < 1e-10);
        assert_eq!(kernel.self_similarity(&x), 1.0);
    }

    #[test]
    fn test_rbf_kernel_decreases_with_distance() {
        let kernel = RBFKernel::new(1.0);
        let x = Point::new(vec![0.0]);
        let near = Point::new(vec![1.0]);
        let far = Point::new(vec![2.0]);

        let k_near = kernel.compute(&x, &near);
        let k_far = kernel.compute(&x, &far);
        assert!(k_near > k_far);
        assert!((k_near - (-1.0_f64).exp()).abs() < 1e-10);
        assert!((k_far - (-4.0_f64).exp()).abs() < 1e-10);
    }

    #[test]
    fn test_rbf_kernel_symmetry() {
        let kernel = RBFKernel::new(0.5);
        let x = Point::new(vec![1.0, 2.0, 3.0]);
        let y = Point::new(vec![0.0, 2.0, 1.0]);
        assert_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
    }

    #[test]
    fn test_rbf_kernel_bounded() {
        let kernel = RBFKernel::new(1e-6);
        let x = Point::new(vec![1e6]);
        let y = Point::new(vec![-1e6]);
        let result = kernel.compute(&x, &y);
        assert!(result.is_finite());
        assert!((0.0..=1.0).contains(&result));
    }
}
