//! Model serialization and persistence
//!
//! Saves a trained SVM, together with the text pipeline that produced its
//! features, as pretty-printed JSON that the CLI can load again.

use crate::core::{Result, SVMConfig, SVMError, SVMModel};
use crate::kernel::KernelFunction;
use crate::optimizer::TrainedSVM;
use crate::text::{TextPipeline, Vectorizer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel with its resolved hyperparameters
    pub kernel: KernelFunction,
    /// Support vectors, one row each
    pub support_vectors: Vec<Vec<f64>>,
    /// Labels of the support vectors (±1)
    pub support_labels: Vec<f64>,
    /// Multipliers of the support vectors
    pub dual_coefficients: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Positions of the support vectors in the training set
    pub support_indices: Vec<usize>,
    /// Primal weights, linear kernel only
    pub weights: Option<Vec<f64>>,
    /// Configuration the model was trained with
    pub config: SVMConfig,
    /// Text pipeline for models trained on review text
    pub pipeline: Option<TextPipeline>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    pub n_support_vectors: usize,
    pub n_features: usize,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(
        model: &TrainedSVM,
        config: &SVMConfig,
        pipeline: Option<TextPipeline>,
    ) -> Self {
        let support_vectors = model
            .support_vectors()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect();

        Self {
            kernel: *model.kernel(),
            support_vectors,
            support_labels: model.support_labels().to_vec(),
            dual_coefficients: model.dual_coefficients().to_vec(),
            bias: model.bias(),
            support_indices: model.support_vector_indices().to_vec(),
            weights: model.weights().map(|w| w.to_vec()),
            config: config.clone(),
            pipeline,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: model.n_support_vectors(),
                n_features: model.n_features(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::Serialization(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild the trained model; predictions match the saved one exactly
    pub fn to_trained_model(&self) -> Result<TrainedSVM> {
        let n_features = self.metadata.n_features;
        let mut flat = Vec::with_capacity(self.support_vectors.len() * n_features);
        for (i, row) in self.support_vectors.iter().enumerate() {
            if row.len() != n_features {
                return Err(SVMError::InvalidShape(format!(
                    "support vector {i} has {} features, expected {n_features}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        let support_vectors = Array2::from_shape_vec((self.support_vectors.len(), n_features), flat)
            .map_err(|e| SVMError::InvalidShape(e.to_string()))?;

        TrainedSVM::from_parts(
            self.kernel,
            support_vectors,
            Array1::from(self.support_labels.clone()),
            Array1::from(self.dual_coefficients.clone()),
            self.bias,
            self.support_indices.clone(),
            self.weights.clone().map(Array1::from),
        )
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {}", self.kernel.kernel_type());
        if let Some(sigma) = self.kernel.sigma() {
            println!("Sigma: {sigma:.6}");
        }
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Features: {}", self.metadata.n_features);
        println!("Bias: {:.6}", self.bias);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.config.c);
        println!("  Degree: {}", self.config.degree);
        println!("  Coef: {}", self.config.coef);
        println!("  Gamma: {}", self.config.gamma);
        println!("  Epsilon: {}", self.config.epsilon);
        if let Some(pipeline) = &self.pipeline {
            println!("Text Pipeline:");
            println!("  Vectorizer: {}", pipeline.vectorizer().kind());
            println!("  Vocabulary: {}", pipeline.vectorizer().vocabulary().len());
            println!("  Stopwords: {}", pipeline.stopwords().len());
            println!("  Classes: {}", pipeline.label_encoder().classes().join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SVM;
    use crate::core::KernelType;
    use crate::text::{Stopwords, VectorizerKind};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![[2.0, 1.0], [1.5, 2.0], [-2.0, -1.0], [-1.0, -2.5]];
        let y = array![1.0, 1.0, -1.0, -1.0];
        (x, y)
    }

    #[test]
    fn test_model_roundtrip_rbf() -> Result<()> {
        let (x, y) = training_data();
        let mut svm = SVM::new().with_kernel(KernelType::Rbf).with_c(1.0);
        svm.fit(x.view(), y.view())?;

        let serializable = SerializableModel::from_trained_model(svm.model()?, svm.config(), None);
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;

        let loaded = SerializableModel::load_from_file(temp_file.path())?;
        assert_eq!(loaded.kernel, serializable.kernel);
        assert_eq!(loaded.metadata.n_features, 2);
        assert!(loaded.weights.is_none());

        let restored = loaded.to_trained_model()?;
        let query = array![[0.5, 0.5], [-3.0, 0.0], [1.0, -1.0]];
        let restored_values = restored.decision_function(query.view())?;
        let original_values = svm.decision_function(query.view())?;
        for (a, b) in restored_values.iter().zip(original_values.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_linear_model_keeps_weights() -> Result<()> {
        let (x, y) = training_data();
        let mut svm = SVM::new();
        svm.fit(x.view(), y.view())?;

        let serializable = SerializableModel::from_trained_model(svm.model()?, svm.config(), None);
        let json = serde_json::to_string(&serializable).expect("serialize");
        let loaded: SerializableModel = serde_json::from_str(&json).expect("deserialize");

        assert!(loaded.weights.is_some());
        let restored = loaded.to_trained_model()?;
        assert_eq!(restored.predict(x.view())?, y);
        Ok(())
    }

    #[test]
    fn test_pipeline_is_saved() -> Result<()> {
        let texts = vec!["loved it".to_string(), "hated it".to_string()];
        let mut pipeline = TextPipeline::new(VectorizerKind::TfIdf, Stopwords::english());
        let (x, y) = pipeline.fit_transform(&texts, &["pos", "neg"])?;

        let mut svm = SVM::new();
        svm.fit(x.view(), y.view())?;
        let serializable =
            SerializableModel::from_trained_model(svm.model()?, svm.config(), Some(pipeline));

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;
        let loaded = SerializableModel::load_from_file(temp_file.path())?;

        assert_eq!(loaded.pipeline, serializable.pipeline);
        let pipeline = loaded.pipeline.expect("pipeline");
        let features = pipeline.transform(&["I loved it".to_string()])?;
        let restored = serializable.to_trained_model()?;
        assert_eq!(restored.predict(features.view())?, array![1.0]);
        Ok(())
    }

    #[test]
    fn test_ragged_support_vectors_rejected() -> Result<()> {
        let (x, y) = training_data();
        let mut svm = SVM::new().with_kernel(KernelType::Rbf);
        svm.fit(x.view(), y.view())?;

        let mut serializable =
            SerializableModel::from_trained_model(svm.model()?, svm.config(), None);
        serializable.support_vectors[0].pop();
        assert!(matches!(
            serializable.to_trained_model(),
            Err(SVMError::InvalidShape(_))
        ));
        Ok(())
    }

    #[test]
    fn test_zero_sigma_in_file_rejected() -> Result<()> {
        let (x, y) = training_data();
        let mut svm = SVM::new().with_kernel(KernelType::Rbf);
        svm.fit(x.view(), y.view())?;

        let serializable = SerializableModel::from_trained_model(svm.model()?, svm.config(), None);
        let mut json = serde_json::to_value(&serializable).expect("serialize");
        json["kernel"]["rbf"]["sigma"] = serde_json::json!(0.0);
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        std::fs::write(temp_file.path(), json.to_string()).expect("write");

        let loaded = SerializableModel::load_from_file(temp_file.path())?;
        assert!(matches!(
            loaded.to_trained_model(),
            Err(SVMError::InvalidParameter(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_garbage() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        std::fs::write(temp_file.path(), "not json").expect("write");
        assert!(matches!(
            SerializableModel::load_from_file(temp_file.path()),
            Err(SVMError::Serialization(_))
        ));
    }
}
