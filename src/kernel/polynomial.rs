//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, z) = (<x, z> + r)^d
//!
//! Where:
//! - r (coef): independent term in the polynomial
//! - d (degree): degree of the polynomial
//!
//! With d=1 and r=0 the kernel reduces to the linear kernel.

use crate::kernel::traits::Kernel;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Polynomial kernel with configurable degree and coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialKernel {
    /// Degree of the polynomial (default: 3)
    pub degree: u32,
    /// Independent term in the polynomial (default: 0.0)
    pub coef: f64,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Arguments
    /// * `degree` - Degree of the polynomial (must be > 0)
    /// * `coef` - Independent term in the polynomial
    ///
    /// # Examples
    /// ```
    /// use qpsvm::kernel::PolynomialKernel;
    ///
    /// // Quadratic kernel: (x·z + 1)²
    /// let kernel = PolynomialKernel::new(2, 1.0);
    /// assert_eq!(kernel.degree, 2);
    /// ```
    pub fn new(degree: u32, coef: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        Self { degree, coef }
    }

    fn apply(&self, dot_product: f64) -> f64 {
        // Integer power keeps negative bases real
        let base = dot_product + self.coef;
        match i32::try_from(self.degree) {
            Ok(degree) => base.powi(degree),
            Err(_) => base.powf(f64::from(self.degree)),
        }
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(3, 0.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
        self.apply(x.dot(&z))
    }

    fn matrix(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
        a.dot(&b.t()).mapv(|v| self.apply(v))
    }

    fn gram(&self, a: ArrayView2<f64>) -> Array2<f64> {
        self.matrix(a, a)
    }
}
