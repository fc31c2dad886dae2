//! Sigmoid (Tanh) Kernel Implementation
//!
//! The Sigmoid kernel, also known as the Hyperbolic Tangent kernel, is defined as:
//! K(x, z) = tanh(σ * <x, z> + r)
//!
//! where:
//! - σ (sigma) scales the dot product and is derived from the training data
//! - r (coef) is the offset
//!
//! Output values are bounded in [-1, 1]. The kernel is not positive
//! semi-definite for every parameter choice, so the dual QP built from it
//! may be non-convex; with a hard margin this usually shows up as a solver
//! failure.

use crate::kernel::traits::Kernel;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Sigmoid (Hyperbolic Tangent) kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmoidKernel {
    /// Scaling parameter for the dot product
    pub sigma: f64,
    /// Offset parameter (can be positive, negative, or zero)
    pub coef: f64,
}

impl SigmoidKernel {
    /// Creates a new Sigmoid kernel with specified parameters
    ///
    /// # Panics
    /// Panics if sigma is not finite
    ///
    /// # Examples
    /// ```
    /// use qpsvm::kernel::SigmoidKernel;
    ///
    /// let kernel = SigmoidKernel::new(0.1, -1.0);
    /// assert_eq!(kernel.sigma, 0.1);
    /// assert_eq!(kernel.coef, -1.0);
    /// ```
    pub fn new(sigma: f64, coef: f64) -> Self {
        assert!(sigma.is_finite(), "Sigma must be finite, got: {}", sigma);
        Self { sigma, coef }
    }

    fn apply(&self, dot_product: f64) -> f64 {
        (self.sigma * dot_product + self.coef).tanh()
    }
}

impl Kernel for SigmoidKernel {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_sigmoid_kernel_creation() {
        let kernel = SigmoidKernel::new(0.1, -1.0);
        assert_eq!(kernel.sigma, 0.1);
        assert_eq!(kernel.coef, -1.0);
    }

    #[test]
    #[should_panic(expected = "Sigma must be finite")]
    fn test_non_finite_sigma() {
        SigmoidKernel::new(f64::NAN, 0.0);
    }

    #[test]
    fn test_sigmoid_kernel_zero_vectors() {
        let kernel = SigmoidKernel::new(0.1, -1.0);
        let x = array![0.0, 0.0];

        // tanh(0.1 * 0 - 1.0) = tanh(-1.0)
        let expected = (-1.0_f64).tanh();
        assert_relative_eq!(kernel.compute(x.view(), x.view()), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_sigmoid_kernel_value() {
        let kernel = SigmoidKernel::new(0.5, 0.25);
        let x = array![1.0, 2.0];
        let z = array![0.5, -1.0];

        // dot = 0.5 - 2.0 = -1.5, tanh(0.5 * -1.5 + 0.25) = tanh(-0.5)
        let expected = (-0.5_f64).tanh();
        assert_relative_eq!(kernel.compute(x.view(), z.view()), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_sigmoid_bounded_output() {
        let kernel = SigmoidKernel::new(100.0, 0.0);
        let a = array![[10.0, 10.0], [-10.0, 5.0], [0.0, 0.0]];

        let k = kernel.gram(a.view());
        for &v in k.iter() {
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_sigmoid_matrix_matches_pairwise() {
        let kernel = SigmoidKernel::new(0.3, -0.2);
        let a = array![[1.0, 2.0]];
        let b = array![[0.0, 1.0], [2.0, -2.0]];

        let k = kernel.matrix(a.view(), b.view());
        assert_eq!(k.dim(), (1, 2));
        for j in 0..2 {
            assert_relative_eq!(k[[0, j]], kernel.compute(a.row(0), b.row(j)), epsilon = 1e-12);
        }
    }
}
