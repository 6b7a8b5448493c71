//! Error handling for the resume retailor

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetailorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid JSON input: {0}")]
    InvalidJson(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyCompletion,

    #[error("Model returned malformed JSON: {0}")]
    MalformedCompletion(String),

    #[error("Retailoring failed: {0}")]
    Retailoring(String),

    #[error("Document rendering error: {0}")]
    Rendering(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RetailorError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for RetailorError {
    fn from(err: anyhow::Error) -> Self {
        RetailorError::Retailoring(err.to_string())
    }
}
