//! Error types for SVM implementation

use crate::solver::SolverFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    /// Labels, features, kernel name or gamma mode do not fit the expected shape
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("QP solver failed: {0}")]
    SolverFailure(#[from] SolverFailure),

    #[error("Degenerate solution: no dual coefficient above epsilon={epsilon}")]
    DegenerateSolution { epsilon: f64 },

    #[error("Model not fitted")]
    UnfittedModel,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Text pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
