//! Offline selectors
//!
//! Each algorithm consumes a full dataset snapshot and produces an inducing
//! set once; no state survives between calls.

pub mod covertree;
pub mod dpp;
pub mod greedy;
pub mod kmeans;
pub mod random;

pub use self::covertree::CoverTree;
pub use self::dpp::{KDPP, StdDPP};
pub use self::greedy::Greedy;
pub use self::kmeans::KMeans;
pub use self::random::RandomSubset;
