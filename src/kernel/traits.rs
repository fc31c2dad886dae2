//! Kernel trait definition

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Kernel function trait
///
/// A kernel maps two feature vectors to a similarity value. Implementors
/// provide the pairwise form; the matrix forms default to evaluating every
/// pair and may be overridden when a closed matrix expression exists.
///
/// All methods expect both inputs to have the same number of columns.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, z)
    fn compute(&self, x: ArrayView1<f64>, z: ArrayView1<f64>) -> f64;

    /// Compute the M×N matrix K[i, j] = K(a_i, b_j)
    fn matrix(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
        Array2::from_shape_fn((a.nrows(), b.nrows()), |(i, j)| {
            self.compute(a.row(i), b.row(j))
        })
    }

    /// Compute the symmetric Gram matrix of a single collection
    ///
    /// Only the upper triangle is evaluated; the lower triangle is mirrored.
    fn gram(&self, a: ArrayView2<f64>) -> Array2<f64> {
        let n = a.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let value = self.compute(a.row(i), a.row(j));
                k[[i, j]] = value;
                k[[j, i]] = value;
            }
        }
        k
    }
}
