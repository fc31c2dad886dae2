//! Utility functions for SVM operations

/// Input validation helpers
pub mod validation {
    use crate::core::{Result, SVMError};
    use ndarray::{ArrayView1, ArrayView2};

    /// Validate that every label is exactly +1 or -1
    pub fn validate_binary_labels(labels: ArrayView1<f64>) -> Result<()> {
        for (i, &label) in labels.iter().enumerate() {
            if label != 1.0 && label != -1.0 {
                return Err(SVMError::InvalidShape(format!(
                    "invalid label {label} at index {i}: labels must be +1 or -1"
                )));
            }
        }
        Ok(())
    }

    /// Validate that every feature value is finite
    pub fn validate_finite_features(x: ArrayView2<f64>) -> Result<()> {
        for ((row, col), &value) in x.indexed_iter() {
            if !value.is_finite() {
                return Err(SVMError::InvalidShape(format!(
                    "non-finite feature {value} at row {row}, column {col}"
                )));
            }
        }
        Ok(())
    }

    /// Count positive and negative labels and their ratio
    pub fn check_label_balance(labels: ArrayView1<f64>) -> (usize, usize, f64) {
        let positive_count = labels.iter().filter(|&&l| l > 0.0).count();
        let negative_count = labels.len() - positive_count;
        let balance_ratio = if negative_count == 0 {
            f64::INFINITY
        } else {
            positive_count as f64 / negative_count as f64
        };
        (positive_count, negative_count, balance_ratio)
    }
}

/// Memory estimates for the dense Gram matrix
pub mod memory {
    /// Bytes needed by an n×n `f64` Gram matrix
    pub fn estimate_gram_memory(n_samples: usize) -> usize {
        n_samples
            .saturating_mul(n_samples)
            .saturating_mul(std::mem::size_of::<f64>())
    }

    /// Human readable byte count
    pub fn format_bytes(bytes: usize) -> String {
        const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{bytes} B")
        } else {
            format!("{value:.1} {}", UNITS[unit])
        }
    }
}
