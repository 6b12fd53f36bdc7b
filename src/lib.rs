//! Inducing point selection for sparse kernel machine approximations
//!
//! Computes a reduced representative subset of a point cloud so that
//! kernel-machine computations depend on a small set of size M instead of
//! the full dataset. Offline selectors produce a one-shot subset; online
//! selectors maintain a subset incrementally against a data stream.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod offline;
pub mod online;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{
    select, select_with, update, update_in_place, update_in_place_with, update_with,
    AlgorithmConfig, SelectArgs, Selection, SelectionState,
};
pub use crate::cache::{CacheStats, GramCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SelectionError};
pub use crate::data::{MatrixDataset, MatrixLayout};
pub use crate::kernel::{Kernel, LinearKernel, RBFKernel};
pub use crate::offline::{CoverTree, Greedy, KDPP, KMeans, RandomSubset, StdDPP};
pub use crate::online::{StreamKmeans, UniGrid, Webscale, OIPS, SeqDPP};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
