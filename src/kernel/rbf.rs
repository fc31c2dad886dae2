//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, z) = exp(-||x - z||² / (2σ²))
//! where σ (sigma) is the bandwidth derived from the training data.

use crate::kernel::Kernel;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Gaussian RBF kernel: K(x, z) = exp(-||x - z||² / (2σ²))
///
/// A larger sigma widens the kernel so that distant points still look
/// similar; a smaller sigma makes the similarity fall off quickly.
/// The Gram matrix uses the trait's symmetric upper-triangle evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RBFKernel {
    sigma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with the given bandwidth
    ///
    /// # Panics
    /// Panics if sigma is not positive and finite
    pub fn new(sigma: f64) -> Self {
        assert!(
            sigma > 0.0 && sigma.is_finite(),
            "Sigma must be positive, got: {}",
            sigma
        );
        Self { sigma }
    }

    /// Get the sigma parameter
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
        let squared_distance = squared_euclidean_distance(x, z);
        (-squared_distance / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// ||x - z||² = Σᵢ (xᵢ - zᵢ)²
fn squared_euclidean_distance(x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(z.iter())
        .map(|(&a, &b)| (a - b) * (a - b))
        .sum()
}
