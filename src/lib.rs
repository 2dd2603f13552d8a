// src/lib.rs

//! Numerical building blocks for solving partial differential equations.
//!
//! Two independent engines live here:
//!
//! * [`topology`]: nodes shared between simplex elements, with signed simplex
//!   volume computation.
//! * [`grid`]: a regular-grid finite-difference Laplacian assembled into a
//!   sparse matrix and solved with conjugate gradients.

pub mod error;
pub mod grid;
pub mod input;
pub mod topology;
pub mod utils;

pub use error::PdeError;
pub use grid::{BoundaryStencil, GridAssembler, GridSolver};
pub use input::{parse_input_deck, InputDeck};
pub use topology::{Coordinates, Element, Node, NodeRef};
