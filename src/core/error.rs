//! Error types for inducing point selection

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Missing argument `{argument}` required by {algorithm}")]
    MissingArgument {
        algorithm: &'static str,
        argument: &'static str,
    },

    #[error("Standard DPP sampled an empty subset after {retries} retries")]
    EmptyResult { retries: usize },

    #[error("State mismatch: {0}")]
    StateMismatch(String),

    #[error("Algorithm {algorithm} does not support incremental updates")]
    UnsupportedUpdate { algorithm: &'static str },
}

pub type Result<T> = std::result::Result<T, SelectionError>;
