//! Kernel functions for SVM
//!
//! Each kernel family lives in its own module and implements [`Kernel`].
//! [`KernelFunction`] is the resolved, parameter-carrying choice stored in a
//! fitted model; it dispatches to the family implementations.

pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod sigmoid;
pub mod traits;

pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::sigmoid::*;
pub use self::traits::*;

use crate::core::{KernelType, Result, SVMConfig, SVMError};
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// A kernel family together with its resolved hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelFunction {
    Linear,
    Polynomial(PolynomialKernel),
    Rbf(RBFKernel),
    Sigmoid(SigmoidKernel),
}

impl KernelFunction {
    /// Resolve the configured kernel against the training matrix.
    ///
    /// sigma is derived from `x` only for the rbf and sigmoid families.
    pub fn from_config(config: &SVMConfig, x: ArrayView2<f64>) -> Result<Self> {
        let kernel = match config.kernel {
            KernelType::Linear => KernelFunction::Linear,
            KernelType::Polynomial => {
                if config.degree == 0 {
                    return Err(SVMError::InvalidParameter(
                        "polynomial degree must be positive".to_string(),
                    ));
                }
                KernelFunction::Polynomial(PolynomialKernel::new(config.degree, config.coef))
            }
            KernelType::Rbf => {
                let sigma = config.gamma.sigma(x);
                if !(sigma > 0.0 && sigma.is_finite()) {
                    return Err(SVMError::InvalidParameter(format!(
                        "rbf kernel needs a positive sigma, gamma={} gave {sigma}",
                        config.gamma
                    )));
                }
                KernelFunction::Rbf(RBFKernel::new(sigma))
            }
            KernelType::Sigmoid => {
                let sigma = config.gamma.sigma(x);
                if !sigma.is_finite() {
                    return Err(SVMError::InvalidParameter(format!(
                        "sigmoid kernel needs a finite sigma, gamma={} gave {sigma}",
                        config.gamma
                    )));
                }
                KernelFunction::Sigmoid(SigmoidKernel::new(sigma, config.coef))
            }
        };
        Ok(kernel)
    }

    /// The family of this kernel
    pub fn kernel_type(&self) -> KernelType {
        match self {
            KernelFunction::Linear => KernelType::Linear,
            KernelFunction::Polynomial(_) => KernelType::Polynomial,
            KernelFunction::Rbf(_) => KernelType::Rbf,
            KernelFunction::Sigmoid(_) => KernelType::Sigmoid,
        }
    }

    /// The data-derived sigma, for the families that use one
    pub fn sigma(&self) -> Option<f64> {
        match self {
            KernelFunction::Rbf(k) => Some(k.sigma()),
            KernelFunction::Sigmoid(k) => Some(k.sigma),
            _ => None,
        }
    }

    /// Check the hyperparameters of a kernel that did not come through
    /// [`KernelFunction::from_config`], such as one read back from a model file.
    pub fn validate(&self) -> Result<()> {
        match self {
            KernelFunction::Linear => Ok(()),
            KernelFunction::Polynomial(k) => {
                if k.degree == 0 || i32::try_from(k.degree).is_err() {
                    return Err(SVMError::InvalidParameter(format!(
                        "polynomial degree must be between 1 and {}, got {}",
                        i32::MAX,
                        k.degree
                    )));
                }
                check_finite("polynomial coef", k.coef)
            }
            KernelFunction::Rbf(k) => {
                if !(k.sigma() > 0.0 && k.sigma().is_finite()) {
                    return Err(SVMError::InvalidParameter(format!(
                        "rbf kernel needs a positive sigma, got {}",
                        k.sigma()
                    )));
                }
                Ok(())
            }
            KernelFunction::Sigmoid(k) => {
                check_finite("sigmoid sigma", k.sigma)?;
                check_finite("sigmoid coef", k.coef)
            }
        }
    }

    fn inner(&self) -> &dyn Kernel {
        match self {
            KernelFunction::Linear => &LinearKernel,
            KernelFunction::Polynomial(k) => k,
            KernelFunction::Rbf(k) => k,
            KernelFunction::Sigmoid(k) => k,
        }
    }

    /// Similarity matrix between the rows of `a` (M×D) and `b` (N×D)
    pub fn compute(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<Array2<f64>> {
        if a.ncols() != b.ncols() {
            return Err(SVMError::InvalidShape(format!(
                "kernel inputs have {} and {} features",
                a.ncols(),
                b.ncols()
            )));
        }
        Ok(self.inner().matrix(a, b))
    }

    /// Similarity between two single feature vectors
    pub fn compute_pair(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
        self.inner().compute(x, z)
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SVMError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

impl Kernel for KernelFunction {
    fn compute(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
        self.inner().compute(x, z)
    }

    fn matrix(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
        self.inner().matrix(a, b)
    }

    fn gram(&self, a: ArrayView2<f64>) -> Array2<f64> {
        self.inner().gram(a)
    }
}
