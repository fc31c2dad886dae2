//! SVM training and the fitted model
//!
//! [`SVMOptimizer`] turns `(X, y)` into the dual QP, hands it to a
//! [`QpSolver`] and builds a [`TrainedSVM`] from the multipliers it returns.

use crate::core::{Result, SVMConfig, SVMError, SVMModel};
use crate::kernel::{Kernel, KernelFunction};
use crate::solver::{DualQp, QpSolver, SMOSolver};
use crate::utils::{memory, validation};
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Trains an SVM by solving its dual with a pluggable QP solver
#[derive(Debug, Clone)]
pub struct SVMOptimizer<S: QpSolver = SMOSolver> {
    solver: S,
    config: SVMConfig,
}

impl SVMOptimizer<SMOSolver> {
    /// Create an optimizer that uses the default SMO solver
    pub fn with_config(config: SVMConfig) -> Self {
        Self::new(SMOSolver::default(), config)
    }
}

impl<S: QpSolver> SVMOptimizer<S> {
    /// Create a new optimizer with the given solver and configuration
    pub fn new(solver: S, config: SVMConfig) -> Self {
        Self { solver, config }
    }

    /// Get the training configuration
    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Get the QP solver
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Train on the rows of `x` with labels `y` (each +1 or -1).
    ///
    /// Inputs are only borrowed; the returned model owns copies of the
    /// support-vector rows.
    pub fn train(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<TrainedSVM> {
        validate_training_data(x, y)?;
        self.config.validate()?;

        let (n_positive, n_negative, _) = validation::check_label_balance(y);
        if n_positive == 0 || n_negative == 0 {
            warn!(
                "training data contains a single class ({n_positive} positive, {n_negative} negative)"
            );
        }

        let kernel = KernelFunction::from_config(&self.config, x)?;
        debug!(
            "building {0}x{0} gram matrix for {1} kernel (~{2})",
            x.nrows(),
            kernel.kernel_type(),
            memory::format_bytes(memory::estimate_gram_memory(x.nrows()))
        );
        let gram = kernel.gram(x);

        let problem = DualQp::svm_dual(&gram, y, self.config.c);
        let solution = self.solver.solve(&problem)?;
        debug!(
            "solver finished after {} iterations (objective {}, gap {:e})",
            solution.iterations, solution.objective, solution.gap
        );

        let lambda = solution.x;
        if lambda.len() != x.nrows() {
            return Err(SVMError::InvalidShape(format!(
                "solver returned {} multipliers for {} samples",
                lambda.len(),
                x.nrows()
            )));
        }

        let support_indices = select_support_indices(lambda.view(), self.config.epsilon);
        if support_indices.is_empty() {
            return Err(SVMError::DegenerateSolution {
                epsilon: self.config.epsilon,
            });
        }
        debug!(
            "{} of {} samples are support vectors",
            support_indices.len(),
            x.nrows()
        );

        let bias = compute_bias(&gram, &support_indices, y, lambda.view());
        let support_vectors = x.select(Axis(0), &support_indices);
        let support_labels = y.select(Axis(0), &support_indices);
        let support_lambda = lambda.select(Axis(0), &support_indices);

        let weights = match kernel {
            KernelFunction::Linear => Some(linear_weights(
                support_vectors.view(),
                support_labels.view(),
                support_lambda.view(),
            )),
            _ => None,
        };

        Ok(TrainedSVM {
            kernel,
            support_vectors,
            support_labels,
            support_lambda,
            bias,
            support_indices,
            dual: Some(lambda),
            weights,
        })
    }
}

/// Check `(X, y)` before any kernel work is done
pub fn validate_training_data(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(SVMError::InvalidShape(
            "training matrix has no rows".to_string(),
        ));
    }
    if y.len() != x.nrows() {
        return Err(SVMError::InvalidShape(format!(
            "{} labels for {} samples",
            y.len(),
            x.nrows()
        )));
    }
    validation::validate_binary_labels(y)?;
    validation::validate_finite_features(x)
}

/// Indices whose multiplier is strictly above `epsilon`, in ascending order
pub fn select_support_indices(lambda: ArrayView1<f64>, epsilon: f64) -> Vec<usize> {
    lambda
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l > epsilon)
        .map(|(i, _)| i)
        .collect()
}

/// b = mean over support vectors of y_s - Σ_j λ_j y_j K(s, j)
fn compute_bias(
    gram: &Array2<f64>,
    support: &[usize],
    y: ArrayView1<f64>,
    lambda: ArrayView1<f64>,
) -> f64 {
    let total: f64 = support
        .iter()
        .map(|&s| {
            let margin: f64 = support
                .iter()
                .map(|&j| lambda[j] * y[j] * gram[[s, j]])
                .sum();
            y[s] - margin
        })
        .sum();
    total / support.len() as f64
}

/// W = Σ λ_i y_i x_i over the support vectors
fn linear_weights(
    support_vectors: ArrayView2<f64>,
    labels: ArrayView1<f64>,
    lambda: ArrayView1<f64>,
) -> Array1<f64> {
    let coefficients = &lambda * &labels;
    support_vectors.t().dot(&coefficients)
}

/// A trained SVM model that can make predictions
#[derive(Debug, Clone)]
pub struct TrainedSVM {
    kernel: KernelFunction,
    support_vectors: Array2<f64>,
    support_labels: Array1<f64>,
    support_lambda: Array1<f64>,
    bias: f64,
    support_indices: Vec<usize>,
    dual: Option<Array1<f64>>,
    weights: Option<Array1<f64>>,
}

impl TrainedSVM {
    /// Rebuild a model from stored parts.
    ///
    /// Used when loading a saved model; the full dual vector is not kept
    /// in that case.
    pub fn from_parts(
        kernel: KernelFunction,
        support_vectors: Array2<f64>,
        support_labels: Array1<f64>,
        support_lambda: Array1<f64>,
        bias: f64,
        support_indices: Vec<usize>,
        weights: Option<Array1<f64>>,
    ) -> Result<Self> {
        kernel.validate()?;
        let n_sv = support_vectors.nrows();
        if support_labels.len() != n_sv
            || support_lambda.len() != n_sv
            || support_indices.len() != n_sv
        {
            return Err(SVMError::InvalidShape(format!(
                "{n_sv} support vectors with {} labels, {} multipliers and {} indices",
                support_labels.len(),
                support_lambda.len(),
                support_indices.len()
            )));
        }
        if let Some(w) = &weights {
            if w.len() != support_vectors.ncols() {
                return Err(SVMError::InvalidShape(format!(
                    "weight vector has {} entries for {} features",
                    w.len(),
                    support_vectors.ncols()
                )));
            }
        }
        Ok(Self {
            kernel,
            support_vectors,
            support_labels,
            support_lambda,
            bias,
            support_indices,
            dual: None,
            weights,
        })
    }

    /// Raw decision values Σ λ y K(x, sv) + b for every row of `x`
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(SVMError::InvalidShape(format!(
                "query has {} features, model was trained on {}",
                x.ncols(),
                self.n_features()
            )));
        }
        if let Some(w) = &self.weights {
            return Ok(x.dot(w) + self.bias);
        }
        let k = self.kernel.compute(x, self.support_vectors.view())?;
        let coefficients = &self.support_lambda * &self.support_labels;
        Ok(k.dot(&coefficients) + self.bias)
    }

    /// Predicted labels (+1 / -1); a decision value of exactly 0 maps to +1
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|v| if v >= 0.0 { 1.0 } else { -1.0 }))
    }

    /// The resolved kernel, including any data-derived sigma
    pub fn kernel(&self) -> &KernelFunction {
        &self.kernel
    }

    /// Get the support vectors
    pub fn support_vectors(&self) -> &Array2<f64> {
        &self.support_vectors
    }

    pub fn support_labels(&self) -> &Array1<f64> {
        &self.support_labels
    }

    /// Multipliers of the support vectors
    pub fn dual_coefficients(&self) -> &Array1<f64> {
        &self.support_lambda
    }

    /// Get the indices of support vectors in the original training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    /// Full multiplier vector from the solver, if this model was trained here
    pub fn dual(&self) -> Option<&Array1<f64>> {
        self.dual.as_ref()
    }

    /// Primal weights, only for the linear kernel
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn n_features(&self) -> usize {
        self.support_vectors.ncols()
    }
}

impl SVMModel for TrainedSVM {
    fn decision_value(&self, x: ArrayView1<f64>) -> Result<f64> {
        if x.len() != self.n_features() {
            return Err(SVMError::InvalidShape(format!(
                "query has {} features, model was trained on {}",
                x.len(),
                self.n_features()
            )));
        }
        if let Some(w) = &self.weights {
            return Ok(x.dot(w) + self.bias);
        }
        let sum = self
            .support_vectors
            .rows()
            .into_iter()
            .zip(self.support_lambda.iter().zip(self.support_labels.iter()))
            .map(|(sv, (&lambda, &label))| lambda * label * self.kernel.compute_pair(x, sv))
            .sum::<f64>();
        Ok(sum + self.bias)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.nrows()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}
