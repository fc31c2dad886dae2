//! Dual QP instance and the solver interface
//!
//! The SVM dual is handed to a solver in the canonical form
//!
//! ```text
//! minimize    ½ λᵗ Q λ + qᵗ λ
//! subject to  G λ ≤ h
//!             A λ = b
//! ```
//!
//! The trainer only assembles the instance and reads the solution back,
//! so any solver implementing [`QpSolver`] can be plugged in.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

/// Failure reported by a QP solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverFailure {
    #[error("did not converge within {iterations} iterations")]
    MaxIterations { iterations: usize },

    #[error("multiplier {index} grew past {bound:e}; the primal problem looks infeasible")]
    Diverged { index: usize, bound: f64 },

    #[error("unsupported problem structure: {0}")]
    Unsupported(String),

    #[error("invalid problem: {0}")]
    InvalidProblem(String),
}

/// Solution vector plus convergence information
#[derive(Debug, Clone)]
pub struct QpSolution {
    /// Optimal point (the dual multipliers)
    pub x: Array1<f64>,
    /// Number of solver iterations
    pub iterations: usize,
    /// Objective value ½ xᵗ Q x + qᵗ x at `x`
    pub objective: f64,
    /// Final optimality gap
    pub gap: f64,
}

/// A quadratic program in the canonical `(Q, q, G, h, A, b)` form
#[derive(Debug, Clone)]
pub struct DualQp {
    /// Q: n×n quadratic term
    pub quadratic: Array2<f64>,
    /// q: linear term of length n
    pub linear: Array1<f64>,
    /// G: m×n inequality matrix
    pub inequality: Array2<f64>,
    /// h: right-hand side of the inequalities
    pub inequality_bound: Array1<f64>,
    /// A: p×n equality matrix
    pub equality: Array2<f64>,
    /// b: right-hand side of the equalities
    pub equality_bound: Array1<f64>,
}

impl DualQp {
    /// Assemble the SVM dual for labels `y` and Gram matrix `gram`.
    ///
    /// `Q = (y yᵗ) ⊙ K`, `q = -1`, `λ ≥ 0` and, when `c > 0`, `λ ≤ c`,
    /// with the single equality `yᵗ λ = 0`.
    pub fn svm_dual(gram: &Array2<f64>, y: ArrayView1<f64>, c: f64) -> Self {
        let n = y.len();
        let y_col = y.insert_axis(Axis(1));
        let y_row = y.insert_axis(Axis(0));
        let quadratic = &y_col.dot(&y_row) * gram;
        let linear = Array1::from_elem(n, -1.0);

        let rows = if c > 0.0 { 2 * n } else { n };
        let mut inequality = Array2::zeros((rows, n));
        let mut inequality_bound = Array1::zeros(rows);
        for i in 0..n {
            inequality[[i, i]] = -1.0;
            if c > 0.0 {
                inequality[[n + i, i]] = 1.0;
                inequality_bound[n + i] = c;
            }
        }

        let equality = y.to_owned().insert_axis(Axis(0));
        let equality_bound = Array1::zeros(1);

        Self {
            quadratic,
            linear,
            inequality,
            inequality_bound,
            equality,
            equality_bound,
        }
    }

    /// Number of variables
    pub fn n_variables(&self) -> usize {
        self.linear.len()
    }

    /// Objective value at `x`
    pub fn objective(&self, x: ArrayView1<f64>) -> f64 {
        0.5 * x.dot(&self.quadratic.dot(&x)) + self.linear.dot(&x)
    }

    /// Check that all blocks agree on the number of variables
    pub fn check_dimensions(&self) -> Result<(), SolverFailure> {
        let n = self.n_variables();
        let checks = [
            (self.quadratic.dim() == (n, n), "Q must be n×n"),
            (self.inequality.ncols() == n, "G must have n columns"),
            (
                self.inequality.nrows() == self.inequality_bound.len(),
                "G and h disagree on the number of rows",
            ),
            (self.equality.ncols() == n, "A must have n columns"),
            (
                self.equality.nrows() == self.equality_bound.len(),
                "A and b disagree on the number of rows",
            ),
        ];
        for (ok, message) in checks {
            if !ok {
                return Err(SolverFailure::InvalidProblem(message.to_string()));
            }
        }
        Ok(())
    }
}

/// Narrow interface to a numerical QP solver
pub trait QpSolver: Send + Sync {
    fn solve(&self, problem: &DualQp) -> Result<QpSolution, SolverFailure>;
}

impl<S: QpSolver + ?Sized> QpSolver for &S {
    fn solve(&self, problem: &DualQp) -> Result<QpSolution, SolverFailure> {
        (**self).solve(problem)
    }
}
