//! Encoding of string class labels into ±1

use crate::core::{Result, SVMError};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Maps exactly two string classes onto -1 and +1.
///
/// Classes are sorted, so `negative`/`positive` become -1/+1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder on string labels
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> &mut Self {
        let mut unique: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        unique.sort();
        unique.dedup();
        self.classes = unique;
        self
    }

    /// Sorted distinct classes seen by `fit`
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// First class becomes -1, second +1
    pub fn transform_binary<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<f64>> {
        let (negative, positive) = self.binary_classes()?;
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                if label == negative {
                    Ok(-1.0)
                } else if label == positive {
                    Ok(1.0)
                } else {
                    Err(SVMError::InvalidShape(format!(
                        "label '{label}' was not seen when fitting the encoder"
                    )))
                }
            })
            .collect()
    }

    pub fn fit_transform_binary<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Array1<f64>> {
        self.fit(labels);
        self.transform_binary(labels)
    }

    /// Positive values map back to the second class, the rest to the first
    pub fn inverse_transform_binary(&self, encoded: ArrayView1<f64>) -> Result<Vec<String>> {
        let (negative, positive) = self.binary_classes()?;
        Ok(encoded
            .iter()
            .map(|&v| {
                if v > 0.0 {
                    positive.to_string()
                } else {
                    negative.to_string()
                }
            })
            .collect())
    }

    fn binary_classes(&self) -> Result<(&str, &str)> {
        match self.classes.as_slice() {
            [] => Err(SVMError::UnfittedModel),
            [negative, positive] => Ok((negative.as_str(), positive.as_str())),
            other => Err(SVMError::InvalidShape(format!(
                "binary encoding needs exactly two classes, found {}: {:?}",
                other.len(),
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_binary_encoding() {
        let labels = ["positive", "negative", "positive", "negative"];
        let mut encoder = LabelEncoder::new();
        let y = encoder.fit_transform_binary(&labels).unwrap();

        assert_eq!(encoder.classes(), &["negative".to_string(), "positive".to_string()]);
        assert_eq!(y, array![1.0, -1.0, 1.0, -1.0]);

        let back = encoder.inverse_transform_binary(y.view()).unwrap();
        assert_eq!(back, labels);
    }

    #[test]
    fn test_unseen_label() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["neg", "pos"]);
        assert!(matches!(
            encoder.transform_binary(&["neutral"]),
            Err(SVMError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_not_binary() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["a", "b", "c"]);
        assert_eq!(encoder.n_classes(), 3);
        assert!(matches!(
            encoder.transform_binary(&["a"]),
            Err(SVMError::InvalidShape(_))
        ));

        encoder.fit(&["only", "only"]);
        assert!(encoder.transform_binary(&["only"]).is_err());
    }

    #[test]
    fn test_unfitted() {
        let encoder = LabelEncoder::new();
        assert!(matches!(
            encoder.transform_binary(&["a"]),
            Err(SVMError::UnfittedModel)
        ));
    }
}
