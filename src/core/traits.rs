//! Core traits for SVM implementation

use crate::core::{Prediction, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Trained SVM model
pub trait SVMModel: Send + Sync {
    /// Raw decision value for a single feature vector.
    ///
    /// Fails with `InvalidShape` when `x` does not have the number of
    /// features the model was trained on.
    fn decision_value(&self, x: ArrayView1<f64>) -> Result<f64>;

    /// Predict a single feature vector
    fn predict_one(&self, x: ArrayView1<f64>) -> Result<Prediction> {
        Ok(Prediction::from_decision(self.decision_value(x)?))
    }

    /// Predict every row of a matrix
    fn predict_rows(&self, x: ArrayView2<f64>) -> Result<Vec<Prediction>> {
        x.rows().into_iter().map(|row| self.predict_one(row)).collect()
    }

    /// Labels (+1 / -1) for every row of a matrix
    fn predict_labels(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(row).map(|p| p.label))
            .collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term
    fn bias(&self) -> f64;
}
