//! Error types for the obesity classifier

use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, ObesityError>;

/// Main error type for training, persistence and inference
#[derive(Error, Debug)]
pub enum ObesityError {
    /// Malformed or missing dataset at training time
    #[error("Training data error: {0}")]
    TrainingData(String),

    /// The serialized model could not be read or decoded
    #[error("Failed to load model artifact from {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<polars::error::PolarsError> for ObesityError {
    fn from(err: polars::error::PolarsError) -> Self {
        ObesityError::TrainingData(err.to_string())
    }
}

impl From<serde_json::Error> for ObesityError {
    fn from(err: serde_json::Error) -> Self {
        ObesityError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for ObesityError {
    fn from(err: bincode::Error) -> Self {
        ObesityError::Serialization(err.to_string())
    }
}
