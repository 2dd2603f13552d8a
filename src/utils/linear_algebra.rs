// src/utils/linear_algebra.rs

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

/// Computes `n!` iteratively.
///
/// Intended for small spatial dimensions only; larger values overflow.
pub fn factorial(n: usize) -> usize {
    (1..=n).product()
}

/// Returns the diagonal of a square sparse matrix. Missing entries are zero.
pub fn sparse_diagonal(matrix: &CsrMatrix<f64>) -> DVector<f64> {
    let mut diagonal = DVector::zeros(matrix.nrows().min(matrix.ncols()));
    for (i, j, v) in matrix.triplet_iter() {
        if i == j {
            diagonal[i] += *v;
        }
    }
    diagonal
}

/// Checks whether a sparse matrix is symmetric up to `tolerance`.
pub fn is_symmetric(matrix: &CsrMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let dense = DMatrix::from(matrix);
    (&dense - dense.transpose()).amax() <= tolerance
}
