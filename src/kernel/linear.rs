//! Linear kernel implementation

use crate::kernel::Kernel;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Linear kernel: K(x, z) = x^T * z
///
/// The matrix form is a single matrix product A · Bᵗ.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64 {
        x.dot(&z)
    }

    fn matrix(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
        a.dot(&b.t())
    }

    fn gram(&self, a: ArrayView2<f64>) -> Array2<f64> {
        a.dot(&a.t())
    }
}
