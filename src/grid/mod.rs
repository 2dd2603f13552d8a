// src/grid/mod.rs

pub mod assembler;
pub mod cg;
pub mod solver;

pub use assembler::{BoundaryStencil, GridAssembler};
pub use cg::{CgReport, ConjugateGradient};
pub use solver::{GridSolver, Solution};
