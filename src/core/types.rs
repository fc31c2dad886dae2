//! Core type definitions for SVM

use crate::core::{Result, SVMError};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a prediction from a raw decision value.
    ///
    /// A decision value of exactly zero is assigned to the positive class.
    pub fn from_decision(decision_value: f64) -> Self {
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Kernel family selected by name in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Polynomial,
    Rbf,
    Sigmoid,
}

impl KernelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Polynomial => "polynomial",
            KernelType::Rbf => "rbf",
            KernelType::Sigmoid => "sigmoid",
        }
    }

    /// Whether this kernel reads the data-derived sigma
    pub fn uses_sigma(&self) -> bool {
        matches!(self, KernelType::Rbf | KernelType::Sigmoid)
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelType {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "linear" => Ok(KernelType::Linear),
            "polynomial" => Ok(KernelType::Polynomial),
            "rbf" => Ok(KernelType::Rbf),
            "sigmoid" => Ok(KernelType::Sigmoid),
            other => Err(SVMError::InvalidShape(format!(
                "unknown kernel '{other}', expected one of linear, polynomial, rbf, sigmoid"
            ))),
        }
    }
}

/// How sigma is derived from the training matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GammaMode {
    /// sigma = n_samples * var(X)
    Scale,
    /// sigma = n_samples
    Auto,
}

impl GammaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GammaMode::Scale => "scale",
            GammaMode::Auto => "auto",
        }
    }

    /// Derive sigma from the training matrix.
    ///
    /// The variance is the population variance over every entry of `x`.
    pub fn sigma(&self, x: ArrayView2<f64>) -> f64 {
        let n_samples = x.nrows() as f64;
        match self {
            GammaMode::Scale => n_samples * variance(x),
            GammaMode::Auto => n_samples,
        }
    }
}

impl fmt::Display for GammaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GammaMode {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "scale" => Ok(GammaMode::Scale),
            "auto" => Ok(GammaMode::Auto),
            other => Err(SVMError::InvalidShape(format!(
                "unsupported gamma mode '{other}', expected scale or auto"
            ))),
        }
    }
}

fn variance(x: ArrayView2<f64>) -> f64 {
    let count = x.len();
    if count == 0 {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / count as f64;
    x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / count as f64
}

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Kernel family
    pub kernel: KernelType,
    /// Soft-margin penalty; 0 means hard margin (unbounded multipliers)
    pub c: f64,
    /// Polynomial degree
    pub degree: u32,
    /// Additive coefficient for polynomial and sigmoid kernels
    pub coef: f64,
    /// sigma derivation for rbf and sigmoid kernels
    pub gamma: GammaMode,
    /// Support-vector inclusion threshold on the dual coefficients
    pub epsilon: f64,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            kernel: KernelType::Linear,
            c: 0.0,
            degree: 3,
            coef: 0.0,
            gamma: GammaMode::Scale,
            epsilon: 1e-6,
        }
    }
}

impl SVMConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !self.c.is_finite() || self.c < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "C must be finite and non-negative, got: {}",
                self.c
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "epsilon must be positive, got: {}",
                self.epsilon
            )));
        }
        if self.kernel == KernelType::Polynomial
            && (self.degree == 0 || i32::try_from(self.degree).is_err())
        {
            return Err(SVMError::InvalidParameter(format!(
                "polynomial degree must be between 1 and {}, got: {}",
                i32::MAX,
                self.degree
            )));
        }
        if !self.coef.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "coef must be finite, got: {}",
                self.coef
            )));
        }
        Ok(())
    }

    /// Whether the soft-margin upper bound applies
    pub fn is_soft_margin(&self) -> bool {
        self.c > 0.0
    }
}

/// Configuration for the default QP solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Stopping tolerance on the KKT violation gap
    pub tolerance: f64,
    /// Iteration cap; `None` means max(10_000_000, 100 * n)
    pub max_iterations: Option<usize>,
    /// A multiplier above this bound is reported as divergence
    pub divergence_bound: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: None,
            divergence_bound: 1e10,
        }
    }
}

impl SolverConfig {
    /// Iteration cap for a problem with `n` variables
    pub fn iteration_limit(&self, n: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| 10_000_000usize.max(n.saturating_mul(100)))
    }
}
