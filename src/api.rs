//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ndarray::array;
//! use qpsvm::api::SVM;
//! use qpsvm::core::KernelType;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let x = array![[1.0, 1.0], [2.0, 2.0], [-1.0, -1.0], [-2.0, -2.0]];
//! let y = array![1.0, 1.0, -1.0, -1.0];
//!
//! let mut svm = SVM::new().with_kernel(KernelType::Linear).with_c(1.0);
//! svm.fit(x.view(), y.view())?;
//!
//! let predictions = svm.predict(array![[3.0, 3.0]].view())?;
//! println!("Predicted: {predictions}");
//! println!("Accuracy: {:.2}%", svm.evaluate(x.view(), y.view())? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    GammaMode, KernelType, Prediction, Result, SVMConfig, SVMError, SVMModel,
};
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use crate::solver::{QpSolver, SMOSolver};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// High-level SVM interface with builder pattern
///
/// Starts unfitted; [`SVM::fit`] moves it to the fitted state and a later
/// `fit` replaces everything learned before.
#[derive(Debug, Clone)]
pub struct SVM<S: QpSolver = SMOSolver> {
    config: SVMConfig,
    solver: S,
    model: Option<TrainedSVM>,
}

impl SVM<SMOSolver> {
    /// Create a new SVM with linear kernel, hard margin and the SMO solver
    pub fn new() -> Self {
        Self {
            config: SVMConfig::default(),
            solver: SMOSolver::default(),
            model: None,
        }
    }

    /// Set the solver's convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.solver = self.solver.with_tolerance(tolerance);
        self
    }

    /// Set maximum number of solver iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.solver = self.solver.with_max_iterations(max_iterations);
        self
    }
}

impl Default for SVM<SMOSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: QpSolver> SVM<S> {
    /// Select the kernel family
    pub fn with_kernel(mut self, kernel: KernelType) -> Self {
        self.config.kernel = kernel;
        self
    }

    /// Select the kernel family by name (`linear`, `polynomial`, `rbf`, `sigmoid`)
    pub fn with_kernel_name(self, name: &str) -> Result<Self> {
        let kernel = name.parse()?;
        Ok(self.with_kernel(kernel))
    }

    /// Set regularization parameter C (0 = hard margin)
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the polynomial degree
    pub fn with_degree(mut self, degree: u32) -> Self {
        self.config.degree = degree;
        self
    }

    /// Set the additive coefficient of the polynomial and sigmoid kernels
    pub fn with_coef(mut self, coef: f64) -> Self {
        self.config.coef = coef;
        self
    }

    pub fn with_gamma(mut self, gamma: GammaMode) -> Self {
        self.config.gamma = gamma;
        self
    }

    /// Set the support-vector threshold on the dual coefficients
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SVMConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the QP solver; any fitted state is dropped
    pub fn with_solver<T: QpSolver>(self, solver: T) -> SVM<T> {
        SVM {
            config: self.config,
            solver,
            model: None,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Train on `(x, y)`, replacing any previous fit.
    ///
    /// On error the SVM is left unfitted.
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<&mut Self> {
        self.model = None;
        let optimizer = SVMOptimizer::new(&self.solver, self.config.clone());
        self.model = Some(optimizer.train(x, y)?);
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Get the underlying trained model
    pub fn model(&self) -> Result<&TrainedSVM> {
        self.model.as_ref().ok_or(SVMError::UnfittedModel)
    }

    /// Take the trained model out of the builder
    pub fn into_model(self) -> Result<TrainedSVM> {
        self.model.ok_or(SVMError::UnfittedModel)
    }

    /// Predicted labels (+1 / -1) for every row of `x`
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.model()?.predict(x)
    }

    /// Raw decision values for every row of `x`
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        self.model()?.decision_function(x)
    }

    /// Label and decision value for every row of `x`
    pub fn predict_detailed(&self, x: ArrayView2<f64>) -> Result<Vec<Prediction>> {
        let values = self.decision_function(x)?;
        Ok(values.iter().map(|&v| Prediction::from_decision(v)).collect())
    }

    /// Evaluate accuracy on labelled data
    pub fn evaluate(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<f64> {
        Ok(self.evaluate_detailed(x, y)?.accuracy())
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
    ) -> Result<EvaluationMetrics> {
        let predicted = self.predict(x)?;
        EvaluationMetrics::from_labels(predicted.view(), y)
    }

    /// Get model information
    pub fn info(&self) -> Result<ModelInfo> {
        Ok(ModelInfo::from_model(self.model()?))
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Count the confusion matrix of predicted against actual ±1 labels
    pub fn from_labels(predicted: ArrayView1<f64>, actual: ArrayView1<f64>) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(SVMError::InvalidShape(format!(
                "{} predictions for {} labels",
                predicted.len(),
                actual.len()
            )));
        }

        let mut tp = 0; // True positives
        let mut tn = 0; // True negatives
        let mut fp = 0; // False positives
        let mut fn_ = 0; // False negatives

        for (&pred, &label) in predicted.iter().zip(actual.iter()) {
            match (pred > 0.0, label > 0.0) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }

        Ok(Self::new(tp, tn, fp, fn_))
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub kernel: KernelType,
    pub sigma: Option<f64>,
    pub n_support_vectors: usize,
    pub n_features: usize,
    pub bias: f64,
    pub support_vector_indices: Vec<usize>,
}

impl ModelInfo {
    pub fn from_model(model: &TrainedSVM) -> Self {
        Self {
            kernel: model.kernel().kernel_type(),
            sigma: model.kernel().sigma(),
            n_support_vectors: model.n_support_vectors(),
            n_features: model.n_features(),
            bias: model.bias(),
            support_vector_indices: model.support_vector_indices().to_vec(),
        }
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;
    use crate::data::split::{select_labels, select_rows, train_test_split};

    /// Train a hard-margin linear SVM with default parameters
    pub fn train_linear(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<SVM> {
        let mut svm = SVM::new();
        svm.fit(x, y)?;
        Ok(svm)
    }

    /// Train a soft-margin RBF SVM with gamma = scale
    pub fn train_rbf(x: ArrayView2<f64>, y: ArrayView1<f64>, c: f64) -> Result<SVM> {
        let mut svm = SVM::new().with_kernel(KernelType::Rbf).with_c(c);
        svm.fit(x, y)?;
        Ok(svm)
    }

    /// Hold-out validation: seeded random split, fit on one part, score the other
    pub fn holdout_accuracy(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        config: SVMConfig,
        test_ratio: f64,
        seed: u64,
    ) -> Result<f64> {
        if x.nrows() != y.len() {
            return Err(SVMError::InvalidShape(format!(
                "{} labels for {} samples",
                y.len(),
                x.nrows()
            )));
        }
        let split = train_test_split(x.nrows(), test_ratio, seed)?;

        let x_train = select_rows(x, &split.train);
        let y_train = select_labels(y, &split.train);
        let x_test = select_rows(x, &split.test);
        let y_test = select_labels(y, &split.test);

        let mut svm = SVM::new().with_config(config);
        svm.fit(x_train.view(), y_train.view())?;
        svm.evaluate(x_test.view(), y_test.view())
    }
}
