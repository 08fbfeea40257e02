//! Error types for the maintenance pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, MaintenanceError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Cannot stratify: class {class} has {count} member(s), at least 2 are required")]
    StratificationError { class: i64, count: usize },

    #[error("Unsupported model: '{0}' (expected one of: logistic, decision_tree, svm)")]
    UnsupportedModel(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for MaintenanceError {
    fn from(err: polars::error::PolarsError) -> Self {
        MaintenanceError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for MaintenanceError {
    fn from(err: serde_json::Error) -> Self {
        MaintenanceError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for MaintenanceError {
    fn from(err: bincode::Error) -> Self {
        MaintenanceError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MaintenanceError {
    fn from(err: ndarray::ShapeError) -> Self {
        MaintenanceError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
