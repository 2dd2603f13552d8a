// src/utils/mod.rs

pub mod linear_algebra;

// Re-export specific functions for easier access
pub use linear_algebra::{
    factorial,
    is_symmetric,
    sparse_diagonal,
};
