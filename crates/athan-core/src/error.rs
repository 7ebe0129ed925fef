//! Error types for Athan Notes.

use thiserror::Error;

/// Result type alias using the Athan Notes Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Athan Notes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing API keys, missing category config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (bad MIME type, oversized audio, malformed request)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// The model returned JSON that violates the note schema.
    ///
    /// The display string keeps the "Invalid response format" keyword that
    /// the HTTP layer branches on.
    #[error("Invalid response format from Gemini: {0}")]
    InvalidResponse(String),

    /// Notion write/read failed
    #[error("Notion error: {0}")]
    Notion(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
