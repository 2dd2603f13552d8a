// src/topology/mod.rs

pub mod coords;
pub mod element;
pub mod node;

pub use coords::Coordinates;
pub use element::Element;
pub use node::{Node, NodeRef};
