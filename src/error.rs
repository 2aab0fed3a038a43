//! Error types shared by every stage of the modulation toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for signal-processing operations.
pub type DspResult<T> = Result<T, DspError>;

#[derive(Debug, Error)]
pub enum DspError {
    /// A parameter is outside the domain an operation accepts.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Two sequences that must line up do not.
    #[error("shape mismatch in {context}: expected {expected} samples, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("unsupported audio format in {}: {message}", path.display())]
    UnsupportedFormat { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DspError {
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn shape_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected,
            found,
        }
    }
}
