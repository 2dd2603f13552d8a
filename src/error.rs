// src/error.rs

use thiserror::Error;

/// Errors surfaced by the crate.
///
/// The numerical kernels themselves never fail; these variants cover reading
/// configuration and the few shape checks that replace undefined behaviour.
#[derive(Debug, Error)]
pub enum PdeError {
    #[error("failed to read input deck: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse input deck: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    /// An element was built from a node list of the wrong length.
    #[error("element expects {expected} nodes, got {found}")]
    NodeCount { expected: usize, found: usize },
    #[error("operator has {operator} rows but the source vector has {source_len} entries")]
    DimensionMismatch { operator: usize, source_len: usize },
}

pub type Result<T> = std::result::Result<T, PdeError>;
