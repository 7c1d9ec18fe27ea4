//! Error types for the risk engine

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while fitting a classifier.
///
/// These never reach callers of a predictor: a failed fit is logged and the
/// predictor serves the fallback distribution instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Model not trained")]
    NotTrained,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Errors surfaced by the hazard dispatcher
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown disaster type: {0}")]
    UnknownDisasterType(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
