//! # Application Errors

use bayestree_core::BayesTreeError;
use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model parsed but does not describe a usable factor graph.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error(transparent)]
    Engine(#[from] BayesTreeError),
}
