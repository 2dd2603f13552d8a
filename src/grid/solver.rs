// src/grid/solver.rs

use std::fmt;

use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use super::assembler::{BoundaryStencil, GridAssembler};
use super::cg::{CgReport, ConjugateGradient};
use crate::error::{PdeError, Result};
use crate::input::InputDeck;

/// Source term evaluated at a coordinate vector.
pub type SourceFn = Box<dyn Fn(&[f64]) -> f64>;

/// Result of [`GridSolver::solve_detailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: DVector<f64>,
    /// Convergence of the first and second linear solve.
    pub passes: [CgReport; 2],
}

/// Poisson solver on a regular grid.
///
/// Owns the assembled operator and rebuilds it whenever the grid
/// configuration changes.
pub struct GridSolver {
    max_error: f64,
    assembler: GridAssembler,
    operator: CsrMatrix<f64>,
    source: SourceFn,
}

impl GridSolver {
    /// Creates a solver and assembles its operator.
    ///
    /// # Arguments
    ///
    /// * `max_error` - Requested tolerance. Only compared against the reached
    ///   error in log output; the solve never depends on it.
    /// * `extents` - Number of grid points along each axis.
    /// * `domain` - A \(2 \times D\) matrix of per-axis minimum (row 0) and
    ///   maximum (row 1).
    /// * `source` - Right-hand side of the equation.
    pub fn new<F>(max_error: f64, extents: Vec<usize>, domain: DMatrix<f64>, source: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + 'static,
    {
        let assembler = GridAssembler::new(extents, domain);
        let operator = assembler.build_operator();
        GridSolver { max_error, assembler, operator, source: Box::new(source) }
    }

    /// Builds a solver from a parsed input deck.
    ///
    /// # Returns
    ///
    /// * `Err(PdeError::InvalidGrid)` if the grid has no axes or the domain
    ///   corners do not have one entry per grid axis.
    pub fn from_deck(deck: &InputDeck) -> Result<Self> {
        let grid = &deck.grid;
        let dims = grid.extents.len();
        if dims == 0 {
            return Err(PdeError::InvalidGrid("grid needs at least one axis".to_string()));
        }
        if grid.domain_min.len() != dims || grid.domain_max.len() != dims {
            return Err(PdeError::InvalidGrid(format!(
                "{} extents but domain corners of length {} and {}",
                dims,
                grid.domain_min.len(),
                grid.domain_max.len()
            )));
        }
        let domain = DMatrix::from_fn(2, dims, |row, col| {
            if row == 0 {
                grid.domain_min[col]
            } else {
                grid.domain_max[col]
            }
        });
        let source = deck.source.clone();
        let solver = GridSolver::new(deck.solver.max_error, grid.extents.clone(), domain, move |x| {
            source.evaluate(x)
        });
        Ok(solver.with_boundary(grid.boundary))
    }

    pub fn with_boundary(mut self, boundary: BoundaryStencil) -> Self {
        self.assembler = self.assembler.with_boundary(boundary);
        self.assemble();
        self
    }

    /// Rebuilds the operator from the current grid.
    pub fn assemble(&mut self) {
        self.operator = self.assembler.build_operator();
    }

    pub fn operator(&self) -> &CsrMatrix<f64> {
        &self.operator
    }

    pub fn assembler(&self) -> &GridAssembler {
        &self.assembler
    }

    pub fn spacing(&self) -> &DVector<f64> {
        self.assembler.spacing()
    }

    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// Applies the operator to `u` and scales by the axis-0 spacing,
    /// `(A u) / h_0^2`.
    pub fn derivative(&self, u: &DVector<f64>) -> DVector<f64> {
        (&self.operator * u) * self.spacing()[0].powi(-2)
    }

    /// Interior grid coordinates along axis 0.
    pub fn sample_points(&self) -> DVector<f64> {
        let start = self.assembler.domain()[(0, 0)];
        let h = self.spacing()[0];
        DVector::from_fn(self.assembler.extents()[0], |i, _| start + (i + 1) as f64 * h)
    }

    /// Solves the Poisson problem on the axis-0 sample points.
    pub fn solve(&self) -> Result<DVector<f64>> {
        Ok(self.solve_detailed()?.values)
    }

    /// Solves `A u = f`, re-solves against `A u`, and returns `h_0^2` times
    /// the second solution together with the convergence of both passes.
    ///
    /// # Returns
    ///
    /// * `Err(PdeError::DimensionMismatch)` if the grid has more points than
    ///   axis 0 alone, since the source is only sampled along that axis.
    pub fn solve_detailed(&self) -> Result<Solution> {
        let f = self.sample_points().map(|x| (self.source)(&[x][..]));
        if f.len() != self.operator.nrows() {
            return Err(PdeError::DimensionMismatch {
                operator: self.operator.nrows(),
                source_len: f.len(),
            });
        }

        let cg = ConjugateGradient::new(&self.operator);
        let (u, first) = cg.solve(&f);
        self.report(1, &first);

        let f = &self.operator * &u;
        let (u, second) = cg.solve(&f);
        self.report(2, &second);

        let h = self.spacing()[0];
        Ok(Solution { values: u * (h * h), passes: [first, second] })
    }

    fn report(&self, pass: usize, report: &CgReport) {
        info!(
            "pass {}: #iterations: {} estimated error: {:e}",
            pass, report.iterations, report.error
        );
        if report.error > self.max_error {
            warn!(
                "pass {}: estimated error {:e} exceeds requested {:e}",
                pass, report.error, self.max_error
            );
        }
    }
}

impl fmt::Display for GridSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A: {}", DMatrix::from(&self.operator))?;
        writeln!(f, "extents: {:?}", self.assembler.extents())?;
        writeln!(f, "domain: {}", self.assembler.domain())?;
        write!(f, "h: {}", self.spacing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_input_deck_str;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn unit_interval(extents: usize, source: impl Fn(&[f64]) -> f64 + 'static) -> GridSolver {
        GridSolver::new(1e-8, vec![extents], DMatrix::from_row_slice(2, 1, &[0.0, 1.0]), source)
    }

    #[test]
    fn test_operator_1d() {
        let solver = unit_interval(4, |_| 1.0);
        let h = solver.spacing()[0];
        assert_relative_eq!(h, 0.2);
        let a = DMatrix::from(solver.operator());
        assert_eq!(a.shape(), (4, 4));
        for i in 0..4 {
            assert_relative_eq!(a[(i, i)], 2.0 / (h * h), epsilon = 1e-9);
        }
        for i in 0..3 {
            assert_relative_eq!(a[(i, i + 1)], -1.0 / (h * h), epsilon = 1e-9);
            assert_relative_eq!(a[(i + 1, i)], -1.0 / (h * h), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_derivative() {
        let solver = unit_interval(5, |_| 0.0);
        let u = DVector::from_vec(vec![0.3, -1.0, 2.0, 0.0, 4.5]);
        let h = solver.spacing()[0];
        let expected = DMatrix::from(solver.operator()) * &u / (h * h);
        let derivative = solver.derivative(&u);
        for i in 0..5 {
            assert_relative_eq!(derivative[i], expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sample_points() {
        let domain = DMatrix::from_row_slice(2, 1, &[-1.0, 1.0]);
        let solver = GridSolver::new(1e-8, vec![3], domain, |_| 0.0);
        let x = solver.sample_points();
        assert_relative_eq!(x[0], -0.5, epsilon = 1e-15);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-15);
        assert_relative_eq!(x[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_constant_source() {
        let solver = unit_interval(4, |_| 1.0);
        let h = solver.spacing()[0];
        let solution = solver.solve().unwrap();
        assert_eq!(solution.len(), 4);
        // The central difference is exact for the quadratic x (1 - x) / 2
        for (i, x) in solver.sample_points().iter().enumerate() {
            assert!(solution[i].is_finite());
            assert_relative_eq!(solution[i], h * h * x * (1.0 - x) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sine_source_matches_analytic_solution() {
        let solver = unit_interval(49, |x| (PI * x[0]).sin());
        let h = solver.spacing()[0];
        let solution = solver.solve().unwrap();
        for (i, x) in solver.sample_points().iter().enumerate() {
            let analytic = h * h * (PI * x).sin() / (PI * PI);
            assert!((solution[i] - analytic).abs() < 1e-3 * h * h / (PI * PI));
        }
    }

    #[test]
    fn test_solve_runs_two_passes() {
        let solver = unit_interval(6, |x| 1.0 + x[0]);
        let detailed = solver.solve_detailed().unwrap();
        assert_eq!(detailed.passes.len(), 2);
        assert!(detailed.passes.iter().all(|p| p.iterations > 0));

        let f = solver.sample_points().map(|x| 1.0 + x);
        let cg = ConjugateGradient::new(solver.operator());
        let (single, _) = cg.solve(&f);
        let (second, _) = cg.solve(&(solver.operator() * &single));
        let h = solver.spacing()[0];
        for i in 0..6 {
            assert_relative_eq!(detailed.values[i], h * h * second[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_max_error_does_not_change_result() {
        let domain = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        let strict = GridSolver::new(1e-300, vec![5], domain.clone(), |_| 1.0);
        let loose = GridSolver::new(1.0, vec![5], domain, |_| 1.0);
        assert_eq!(strict.max_error(), 1e-300);
        assert_eq!(strict.solve().unwrap(), loose.solve().unwrap());
    }

    #[test]
    fn test_multi_axis_grid_rejects_axis_zero_source() {
        let domain = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 1.0]);
        let solver = GridSolver::new(1e-8, vec![3, 3], domain, |_| 1.0);
        assert_eq!(solver.operator().nrows(), 9);
        match solver.solve() {
            Err(PdeError::DimensionMismatch { operator, source_len }) => {
                assert_eq!(operator, 9);
                assert_eq!(source_len, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reassemble_after_boundary_change() {
        let domain = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 1.0]);
        let solver = GridSolver::new(1e-8, vec![3, 3], domain, |_| 1.0);
        assert!(DMatrix::from(solver.operator())[(2, 3)] < 0.0);
        let solver = solver.with_boundary(BoundaryStencil::PerAxis);
        assert_eq!(DMatrix::from(solver.operator())[(2, 3)], 0.0);
    }

    #[test]
    fn test_from_deck() {
        let deck = parse_input_deck_str(
            "
solver:
  max_error: 1.0e-6
grid:
  extents: [4]
  domain_min: [0.0]
  domain_max: [1.0]
source:
  kind: constant
  value: 1.0
",
        )
        .unwrap();
        let from_deck = GridSolver::from_deck(&deck).unwrap();
        let direct = unit_interval(4, |_| 1.0);
        assert_eq!(from_deck.max_error(), 1.0e-6);
        assert_eq!(from_deck.solve().unwrap(), direct.solve().unwrap());
    }

    #[test]
    fn test_from_deck_rejects_mismatched_domain() {
        let deck = parse_input_deck_str(
            "
solver:
  max_error: 1.0e-6
grid:
  extents: [4, 4]
  domain_min: [0.0]
  domain_max: [1.0, 1.0]
source:
  kind: squared_norm
",
        )
        .unwrap();
        assert!(matches!(GridSolver::from_deck(&deck), Err(PdeError::InvalidGrid(_))));
    }

    #[test]
    fn test_from_deck_rejects_empty_grid() {
        let deck = parse_input_deck_str(
            "
solver:
  max_error: 1.0e-6
grid:
  extents: []
  domain_min: []
  domain_max: []
source:
  kind: constant
  value: 1.0
",
        )
        .unwrap();
        assert!(matches!(GridSolver::from_deck(&deck), Err(PdeError::InvalidGrid(_))));
    }

    #[test]
    fn test_display() {
        let shown = unit_interval(2, |_| 1.0).to_string();
        assert!(shown.starts_with("A: "));
        assert!(shown.contains("extents: [2]"));
    }
}
