//! Error types for interchange operations.

use thiserror::Error;

/// Errors that can occur while writing a web template.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error during write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
