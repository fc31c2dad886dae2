//! Kernel Support Vector Machine trained through its dual quadratic program
//!
//! The SVM core builds the Gram matrix, hands the dual QP to a pluggable
//! [`QpSolver`](solver::QpSolver) (SMO by default) and keeps the support
//! vectors whose multipliers exceed a threshold. The text pipeline turns
//! movie reviews into bag-of-words or TF-IDF features for it.

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod optimizer;
pub mod persistence;
pub mod solver;
pub mod text;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, SVM};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{FeatureDataset, LabelEncoder, ReviewDataset};
pub use crate::kernel::{Kernel, KernelFunction};
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};
pub use crate::persistence::SerializableModel;
pub use crate::solver::{DualQp, QpSolver, SMOSolver};
pub use crate::text::{BagOfWords, Stopwords, TextPipeline, TfIdf, Vectorizer};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
