// src/grid/cg.rs

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::utils::sparse_diagonal;

/// Convergence information of a single conjugate-gradient run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgReport {
    pub iterations: usize,
    /// Estimated relative residual `|b - Ax| / |b|`.
    pub error: f64,
}

/// Jacobi-preconditioned conjugate-gradient solver for symmetric positive
/// definite sparse systems.
///
/// By default iteration stops once the relative residual drops below machine
/// epsilon or after `2n` iterations, whichever comes first.
#[derive(Debug, Clone)]
pub struct ConjugateGradient<'a> {
    matrix: &'a CsrMatrix<f64>,
    inverse_diagonal: DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
}

impl<'a> ConjugateGradient<'a> {
    pub fn new(matrix: &'a CsrMatrix<f64>) -> Self {
        let inverse_diagonal =
            sparse_diagonal(matrix).map(|d| if d != 0.0 { 1.0 / d } else { 1.0 });
        ConjugateGradient {
            matrix,
            inverse_diagonal,
            tolerance: f64::EPSILON,
            max_iterations: 2 * matrix.ncols(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Solves `A x = rhs` starting from `x = 0`.
    ///
    /// # Returns
    ///
    /// * The approximate solution together with its [`CgReport`]. Running out
    ///   of iterations is not an error; the report carries the residual reached.
    pub fn solve(&self, rhs: &DVector<f64>) -> (DVector<f64>, CgReport) {
        let n = self.matrix.ncols();
        let mut x = DVector::zeros(n);

        let rhs_norm2 = rhs.norm_squared();
        if rhs_norm2 == 0.0 {
            return (x, CgReport { iterations: 0, error: 0.0 });
        }
        let threshold = (self.tolerance * self.tolerance * rhs_norm2).max(f64::MIN_POSITIVE);

        let mut residual = rhs.clone();
        let mut residual_norm2 = residual.norm_squared();
        if residual_norm2 < threshold {
            let error = (residual_norm2 / rhs_norm2).sqrt();
            return (x, CgReport { iterations: 0, error });
        }

        let mut direction = residual.component_mul(&self.inverse_diagonal);
        let mut abs_new = residual.dot(&direction);
        let mut iterations = 0;
        while iterations < self.max_iterations {
            let projected = self.matrix * &direction;
            let curvature = direction.dot(&projected);
            if curvature == 0.0 {
                break;
            }
            let alpha = abs_new / curvature;
            x.axpy(alpha, &direction, 1.0);
            residual.axpy(-alpha, &projected, 1.0);

            residual_norm2 = residual.norm_squared();
            if residual_norm2 < threshold {
                break;
            }

            let z = residual.component_mul(&self.inverse_diagonal);
            let abs_old = abs_new;
            abs_new = residual.dot(&z);
            let beta = abs_new / abs_old;
            direction = z + direction * beta;
            iterations += 1;
        }

        let error = (residual_norm2 / rhs_norm2).sqrt();
        (x, CgReport { iterations, error })
    }
}
