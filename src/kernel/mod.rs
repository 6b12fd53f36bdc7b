//! Kernel oracle capability
//!
//! Selectors consume kernels as opaque similarity oracles; RBF and linear
//! implementations are provided for callers and tests.

pub mod linear;
pub mod rbf;
pub mod traits;

pub use self::linear::*;
pub use self::rbf::*;
pub use self::traits::*;
