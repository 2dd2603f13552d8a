// src/input/input_deck.rs
use std::f64::consts::PI;

use serde::Deserialize;

use crate::grid::BoundaryStencil;

#[derive(Debug, Clone, Deserialize)]
pub struct SolverSettings {
    pub max_error: f64,                  // Requested tolerance, reported against but never enforced
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSettings {
    pub extents: Vec<usize>,             // Grid points per axis
    pub domain_min: Vec<f64>,            // Lower corner of the domain
    pub domain_max: Vec<f64>,            // Upper corner of the domain
    #[serde(default)]
    pub boundary: BoundaryStencil,
}

/// Right-hand side of the Poisson problem.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceTerm {
    Constant { value: f64 },
    /// `x . x`
    SquaredNorm,
    /// `prod_i sin(pi x_i)`, the ground state of a box.
    SineProduct,
}

impl SourceTerm {
    pub fn evaluate(&self, coords: &[f64]) -> f64 {
        match self {
            SourceTerm::Constant { value } => *value,
            SourceTerm::SquaredNorm => coords.iter().map(|x| x * x).sum(),
            SourceTerm::SineProduct => coords.iter().map(|x| (PI * x).sin()).product(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputDeck {
    pub solver: SolverSettings,
    pub grid: GridSettings,
    pub source: SourceTerm,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_source_terms() {
        assert_eq!(SourceTerm::Constant { value: 2.5 }.evaluate(&[0.3, 0.7]), 2.5);
        assert_relative_eq!(SourceTerm::SquaredNorm.evaluate(&[1.0, 2.0]), 5.0);
        assert_relative_eq!(SourceTerm::SineProduct.evaluate(&[0.5, 0.5]), 1.0);
        assert_relative_eq!(SourceTerm::SineProduct.evaluate(&[1.0]), 0.0, epsilon = 1e-15);
    }
}
