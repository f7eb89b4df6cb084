//! Error types for cross-validation and model evaluation

use thiserror::Error;

use crate::models::ModelError;

/// Result type alias for crossval operations
pub type Result<T> = std::result::Result<T, CrossValError>;

/// Step of a fold's train/evaluate cycle that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStage {
    Fit,
    Predict,
}

impl std::fmt::Display for FitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitStage::Fit => write!(f, "fit"),
            FitStage::Predict => write!(f, "predict"),
        }
    }
}

/// Main error type for evaluation runs
#[derive(Error, Debug)]
pub enum CrossValError {
    #[error("Invalid fold count: n_folds = {n_folds} must be in [2, n_samples = {n_samples}]")]
    InvalidFold { n_folds: usize, n_samples: usize },

    #[error("Model failed during {stage} on fold {fold}: {source}")]
    ModelFailure {
        fold: usize,
        stage: FitStage,
        #[source]
        source: ModelError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Evaluation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CrossValError {
    fn from(err: serde_json::Error) -> Self {
        CrossValError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CrossValError {
    fn from(err: ndarray::ShapeError) -> Self {
        CrossValError::InvalidInput(err.to_string())
    }
}
