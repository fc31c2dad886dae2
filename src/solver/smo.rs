//! Sequential Minimal Optimization (SMO) solver for the SVM dual
//!
//! Works on the dense `(Q, q, G, h, A, b)` instance produced by
//! [`DualQp::svm_dual`]. Each iteration picks a maximal-violating pair
//! with second-order working set selection (Fan, Chen & Lin, 2005),
//! moves the pair along the equality constraint and updates the gradient
//! incrementally.
//!
//! Only the box-plus-one-equality structure of an SVM dual is accepted:
//! every inequality row must bound a single variable, there must be exactly
//! one equality `yᵗ λ = 0` with `y ∈ {-1, +1}ⁿ` and the origin must be
//! feasible. Anything else is reported as [`SolverFailure::Unsupported`].

use crate::core::SolverConfig;
use crate::solver::qp::{DualQp, QpSolution, QpSolver, SolverFailure};
use log::debug;
use ndarray::Array1;

/// Curvature floor for non positive-definite pairs
const TAU: f64 = 1e-12;

/// SMO solver for SVM optimization
///
/// Solves the SVM dual by repeatedly optimizing pairs of Lagrange
/// multipliers until the KKT violation gap drops below the tolerance.
#[derive(Debug, Clone, Default)]
pub struct SMOSolver {
    config: SolverConfig,
}

impl SMOSolver {
    /// Create a new SMO solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_divergence_bound(mut self, bound: f64) -> Self {
        self.config.divergence_bound = bound;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

/// Box bounds and labels recovered from the canonical form
#[derive(Debug)]
struct BoxStructure {
    labels: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoxStructure {
    fn from_problem(problem: &DualQp) -> Result<Self, SolverFailure> {
        problem.check_dimensions()?;
        let n = problem.n_variables();

        if problem.quadratic.iter().any(|v| !v.is_finite())
            || problem.linear.iter().any(|v| !v.is_finite())
        {
            return Err(SolverFailure::InvalidProblem(
                "Q and q must be finite".to_string(),
            ));
        }

        if problem.equality.nrows() != 1 {
            return Err(SolverFailure::Unsupported(format!(
                "expected exactly one equality constraint, got {}",
                problem.equality.nrows()
            )));
        }
        if problem.equality_bound[0] != 0.0 {
            return Err(SolverFailure::Unsupported(
                "the equality right-hand side must be zero".to_string(),
            ));
        }
        let labels = problem.equality.row(0).to_vec();
        if labels.iter().any(|&y| y != 1.0 && y != -1.0) {
            return Err(SolverFailure::Unsupported(
                "equality coefficients must be +1 or -1".to_string(),
            ));
        }

        let mut lower = vec![f64::NEG_INFINITY; n];
        let mut upper = vec![f64::INFINITY; n];
        for (row, &rhs) in problem
            .inequality
            .rows()
            .into_iter()
            .zip(problem.inequality_bound.iter())
        {
            let mut nonzero = row.iter().enumerate().filter(|(_, g)| **g != 0.0);
            match (nonzero.next(), nonzero.next()) {
                (None, _) if rhs >= 0.0 => {}
                (None, _) => {
                    return Err(SolverFailure::InvalidProblem(
                        "an empty inequality row has a negative bound".to_string(),
                    ))
                }
                (Some((j, &g)), None) => {
                    let bound = rhs / g;
                    if g > 0.0 {
                        upper[j] = upper[j].min(bound);
                    } else {
                        lower[j] = lower[j].max(bound);
                    }
                }
                (Some(_), Some(_)) => {
                    return Err(SolverFailure::Unsupported(
                        "inequality rows must bound a single variable".to_string(),
                    ))
                }
            }
        }

        for j in 0..n {
            if lower[j] > upper[j] {
                return Err(SolverFailure::InvalidProblem(format!(
                    "variable {j} has an empty box [{}, {}]",
                    lower[j], upper[j]
                )));
            }
            if !lower[j].is_finite() || lower[j] > 0.0 || upper[j] < 0.0 {
                return Err(SolverFailure::Unsupported(format!(
                    "variable {j} needs a finite lower bound and a box containing zero"
                )));
            }
        }

        Ok(Self {
            labels,
            lower,
            upper,
        })
    }

    /// Variable `t` can still move in the direction that increases `y_t λ_t`
    fn in_up(&self, t: usize, lambda: f64) -> bool {
        if self.labels[t] > 0.0 {
            lambda < self.upper[t]
        } else {
            lambda > self.lower[t]
        }
    }

    /// Variable `t` can still move in the direction that decreases `y_t λ_t`
    fn in_low(&self, t: usize, lambda: f64) -> bool {
        if self.labels[t] > 0.0 {
            lambda > self.lower[t]
        } else {
            lambda < self.upper[t]
        }
    }
}

impl SMOSolver {
    /// Pick the working pair, or `None` once the gap is below tolerance.
    ///
    /// Also returns the current KKT violation gap.
    fn select_working_set(
        &self,
        problem: &DualQp,
        structure: &BoxStructure,
        lambda: &Array1<f64>,
        gradient: &Array1<f64>,
    ) -> (Option<(usize, usize)>, f64) {
        let y = &structure.labels;
        let n = lambda.len();

        let mut i = None;
        let mut m = f64::NEG_INFINITY;
        for t in 0..n {
            if structure.in_up(t, lambda[t]) {
                let value = -y[t] * gradient[t];
                if value > m {
                    m = value;
                    i = Some(t);
                }
            }
        }
        let i = match i {
            Some(i) => i,
            None => return (None, 0.0),
        };

        let q = &problem.quadratic;
        let mut j = None;
        let mut big_m = f64::INFINITY;
        let mut best = f64::INFINITY;
        for t in 0..n {
            if !structure.in_low(t, lambda[t]) {
                continue;
            }
            let value = -y[t] * gradient[t];
            big_m = big_m.min(value);
            if value < m {
                let b = m - value;
                let mut a = q[[i, i]] + q[[t, t]] - 2.0 * y[i] * y[t] * q[[i, t]];
                if a <= 0.0 {
                    a = TAU;
                }
                let score = -(b * b) / a;
                if score < best {
                    best = score;
                    j = Some(t);
                }
            }
        }

        let gap = if big_m.is_finite() { m - big_m } else { 0.0 };
        if gap < self.config.tolerance {
            return (None, gap);
        }
        (j.map(|j| (i, j)), gap)
    }
}

impl QpSolver for SMOSolver {
    fn solve(&self, problem: &DualQp) -> Result<QpSolution, SolverFailure> {
        let structure = BoxStructure::from_problem(problem)?;
        let n = problem.n_variables();
        let max_iterations = self.config.iteration_limit(n);
        let q = &problem.quadratic;
        let y = &structure.labels;

        // λ = 0, so the gradient Qλ + q starts at q
        let mut lambda = Array1::<f64>::zeros(n);
        let mut gradient = problem.linear.clone();
        let mut iterations = 0;

        let gap = loop {
            let (pair, gap) = self.select_working_set(problem, &structure, &lambda, &gradient);
            let (i, j) = match pair {
                Some(pair) => pair,
                None => break gap,
            };
            if iterations >= max_iterations {
                debug!("SMO stopped at {iterations} iterations with gap {gap:e}");
                return Err(SolverFailure::MaxIterations { iterations });
            }

            let mut a = q[[i, i]] + q[[j, j]] - 2.0 * y[i] * y[j] * q[[i, j]];
            if a <= 0.0 {
                a = TAU;
            }
            let b = y[j] * gradient[j] - y[i] * gradient[i];

            // λ_i += y_i t, λ_j -= y_j t, limited by both boxes
            let room_i = if y[i] > 0.0 {
                structure.upper[i] - lambda[i]
            } else {
                lambda[i] - structure.lower[i]
            };
            let room_j = if y[j] > 0.0 {
                lambda[j] - structure.lower[j]
            } else {
                structure.upper[j] - lambda[j]
            };
            let step = (b / a).min(room_i).min(room_j);

            let old_i = lambda[i];
            let old_j = lambda[j];
            lambda[i] = (old_i + y[i] * step).clamp(structure.lower[i], structure.upper[i]);
            lambda[j] = (old_j - y[j] * step).clamp(structure.lower[j], structure.upper[j]);

            for index in [i, j] {
                if lambda[index].abs() > self.config.divergence_bound {
                    debug!(
                        "SMO diverged at iteration {iterations}: lambda[{index}] = {:e}",
                        lambda[index]
                    );
                    return Err(SolverFailure::Diverged {
                        index,
                        bound: self.config.divergence_bound,
                    });
                }
            }

            gradient.scaled_add(lambda[i] - old_i, &q.row(i));
            gradient.scaled_add(lambda[j] - old_j, &q.row(j));
            iterations += 1;
        };

        let objective = problem.objective(lambda.view());
        debug!("SMO converged after {iterations} iterations, gap {gap:e}, objective {objective}");

        Ok(QpSolution {
            x: lambda,
            iterations,
            objective,
            gap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn two_point_problem(c: f64) -> DualQp {
        // x = (1, 0) labelled +1 and (-1, 0) labelled -1, linear kernel
        let gram = array![[1.0, -1.0], [-1.0, 1.0]];
        let y = array![1.0, -1.0];
        DualQp::svm_dual(&gram, y.view(), c)
    }

    #[test]
    fn test_smo_solver_creation() {
        let solver = SMOSolver::default()
            .with_tolerance(1e-5)
            .with_max_iterations(100)
            .with_divergence_bound(1e6);

        assert_eq!(solver.config().tolerance, 1e-5);
        assert_eq!(solver.config().max_iterations, Some(100));
        assert_eq!(solver.config().divergence_bound, 1e6);
    }

    #[test]
    fn test_two_point_hard_margin() {
        let solver = SMOSolver::default();
        let result = solver.solve(&two_point_problem(0.0)).expect("Should solve");

        assert_relative_eq!(result.x[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.x[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(result.objective, -0.5, epsilon = 1e-12);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_soft_margin_caps_multipliers() {
        let solver = SMOSolver::default();
        let result = solver.solve(&two_point_problem(0.25)).expect("Should solve");

        assert_relative_eq!(result.x[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(result.x[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_solution_is_dual_feasible() {
        let x = array![
            [2.0, 1.0],
            [1.5, 2.0],
            [3.0, 0.5],
            [-1.0, -2.0],
            [-2.0, -0.5],
            [-1.5, -1.5]
        ];
        let y = array![1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
        let gram = x.dot(&x.t());
        let c = 1.0;
        let problem = DualQp::svm_dual(&gram, y.view(), c);

        let result = SMOSolver::default().solve(&problem).expect("Should solve");

        assert!(result.x.iter().all(|&l| (0.0..=c).contains(&l)));
        assert_relative_eq!(result.x.dot(&y), 0.0, epsilon = 1e-9);
        assert!(result.gap < 1e-3);
        assert!(result.objective < 0.0);
    }

    #[test]
    fn test_non_separable_hard_margin_hits_iteration_cap() {
        // XOR under a linear kernel has an unbounded dual
        let x = array![[1.0, 1.0], [-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]];
        let y = array![1.0, 1.0, -1.0, -1.0];
        let gram = x.dot(&x.t());
        let problem = DualQp::svm_dual(&gram, y.view(), 0.0);

        let solver = SMOSolver::default().with_max_iterations(1_000);
        let result = solver.solve(&problem);

        assert_eq!(
            result.unwrap_err(),
            SolverFailure::MaxIterations { iterations: 1_000 }
        );
    }

    #[test]
    fn test_flat_direction_diverges() {
        let gram = Array2::zeros((2, 2));
        let y = array![1.0, -1.0];
        let problem = DualQp::svm_dual(&gram, y.view(), 0.0);

        let result = SMOSolver::default().solve(&problem);
        assert!(matches!(result, Err(SolverFailure::Diverged { .. })));
    }

    #[test]
    fn test_rejects_coupled_inequalities() {
        let mut problem = two_point_problem(0.0);
        problem.inequality[[0, 1]] = 1.0;

        let result = SMOSolver::default().solve(&problem);
        assert!(matches!(result, Err(SolverFailure::Unsupported(_))));
    }

    #[test]
    fn test_rejects_non_zero_equality_bound() {
        let mut problem = two_point_problem(0.0);
        problem.equality_bound[0] = 1.0;

        let result = SMOSolver::default().solve(&problem);
        assert!(matches!(result, Err(SolverFailure::Unsupported(_))));
    }

    #[test]
    fn test_rejects_non_finite_quadratic() {
        let mut problem = two_point_problem(0.0);
        problem.quadratic[[0, 1]] = f64::NAN;

        let result = SMOSolver::default().solve(&problem);
        assert!(matches!(result, Err(SolverFailure::InvalidProblem(_))));
    }

    #[test]
    fn test_single_class_converges_at_origin() {
        // With one class the equality pins every multiplier at zero
        let gram = array![[1.0, 0.5], [0.5, 1.0]];
        let y = array![1.0, 1.0];
        let problem = DualQp::svm_dual(&gram, y.view(), 0.0);

        let result = SMOSolver::default().solve(&problem).expect("Should solve");
        assert_eq!(result.x, array![0.0, 0.0]);
        assert_eq!(result.iterations, 0);
    }
}
