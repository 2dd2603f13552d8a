// src/topology/coords.rs

use nalgebra::{DVector, SVector};

/// Read access to the coordinates of a point.
///
/// Any container that can hand out its coordinates by axis and compare
/// itself for equality can serve as the location of a [`Node`](super::Node).
pub trait Coordinates: Clone + PartialEq {
    /// Coordinate along `axis`. Reading past the stored axes is a caller error.
    fn coordinate(&self, axis: usize) -> f64;
}

impl<const M: usize> Coordinates for [f64; M] {
    fn coordinate(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Coordinates for Vec<f64> {
    fn coordinate(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Coordinates for DVector<f64> {
    fn coordinate(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl<const M: usize> Coordinates for SVector<f64, M> {
    fn coordinate(&self, axis: usize) -> f64 {
        self[axis]
    }
}
