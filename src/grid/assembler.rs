// src/grid/assembler.rs

use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::Deserialize;

/// How the stencil decides whether a grid point has a neighbour along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStencil {
    /// Only the flattened index is bounds checked. On grids with more than one
    /// axis this links the last point of one line to the first point of the
    /// next.
    #[default]
    FlatIndex,
    /// Neighbours are only linked when the per-axis coordinate stays inside
    /// the grid, giving a homogeneous Dirichlet boundary on every face.
    PerAxis,
}

/// Finite-difference discretisation of the Laplacian on a rectangular grid.
///
/// The grid has `extents[d]` interior points along axis `d`, spread evenly
/// over the open interval between `domain[(0, d)]` and `domain[(1, d)]`.
/// Points are flattened with axis 0 varying fastest.
#[derive(Debug, Clone)]
pub struct GridAssembler {
    extents: Vec<usize>,
    domain: DMatrix<f64>,
    spacing: DVector<f64>,
    boundary: BoundaryStencil,
}

impl GridAssembler {
    /// Creates an assembler for the given grid.
    ///
    /// # Arguments
    ///
    /// * `extents` - Number of grid points along each axis.
    /// * `domain` - A \(2 \times D\) matrix, row 0 holding the per-axis minimum
    ///   and row 1 the per-axis maximum.
    pub fn new(extents: Vec<usize>, domain: DMatrix<f64>) -> Self {
        let spacing = DVector::from_fn(extents.len(), |d, _| {
            (domain[(1, d)] - domain[(0, d)]) / (extents[d] + 1) as f64
        });
        GridAssembler { extents, domain, spacing, boundary: BoundaryStencil::default() }
    }

    pub fn with_boundary(mut self, boundary: BoundaryStencil) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    pub fn domain(&self) -> &DMatrix<f64> {
        &self.domain
    }

    pub fn spacing(&self) -> &DVector<f64> {
        &self.spacing
    }

    pub fn boundary(&self) -> BoundaryStencil {
        self.boundary
    }

    pub fn dimension(&self) -> usize {
        self.extents.len()
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance in the flattened index between neighbours along `axis`.
    pub fn stride(&self, axis: usize) -> usize {
        self.extents[..axis].iter().product()
    }

    /// Flattens per-axis grid coordinates into a single index.
    pub fn to_index(&self, coords: &[usize]) -> usize {
        coords.iter().enumerate().map(|(axis, &c)| c * self.stride(axis)).sum()
    }

    /// Inverse of [`to_index`](Self::to_index).
    ///
    /// # Returns
    ///
    /// * `None` if `index` does not address a point of the grid, which is
    ///   always the case for a grid with an empty axis.
    pub fn coordinates(&self, index: usize) -> Option<Vec<usize>> {
        if index >= self.len() {
            return None;
        }
        let coords = (0..self.dimension())
            .map(|axis| (index / self.stride(axis)) % self.extents[axis])
            .collect();
        Some(coords)
    }

    /// Assembles the discrete Laplacian as a sparse \(n \times n\) matrix.
    ///
    /// Row `n` carries `2 * sum_d h_d^-2` on the diagonal and `-h_d^-2` at
    /// `n +/- stride(d)` for every axis `d` whose neighbour passes the
    /// [`BoundaryStencil`] check.
    pub fn build_operator(&self) -> CsrMatrix<f64> {
        let total = self.len();
        let h_factor: f64 = self.spacing.iter().map(|h| h.powi(-2)).sum();

        let mut coo = CooMatrix::new(total, total);
        for n in 0..total {
            coo.push(n, n, 2.0 * h_factor);
            for axis in 0..self.dimension() {
                let shift = self.stride(axis);
                let weight = -self.spacing[axis].powi(-2);
                if self.has_neighbour(n, axis, shift, false) {
                    coo.push(n, n - shift, weight);
                }
                if self.has_neighbour(n, axis, shift, true) {
                    coo.push(n, n + shift, weight);
                }
            }
        }
        debug!(
            "assembled {}x{} operator with {} stencil entries ({:?} boundary)",
            total,
            total,
            coo.nnz(),
            self.boundary
        );
        CsrMatrix::from(&coo)
    }

    fn has_neighbour(&self, n: usize, axis: usize, shift: usize, forward: bool) -> bool {
        match self.boundary {
            BoundaryStencil::FlatIndex => {
                if forward {
                    n + shift < self.len()
                } else {
                    n >= shift
                }
            }
            BoundaryStencil::PerAxis => {
                let coord = (n / shift) % self.extents[axis];
                if forward {
                    coord + 1 < self.extents[axis]
                } else {
                    coord > 0
                }
            }
        }
    }
}
