//! Error types for storybook.

use thiserror::Error;

/// Result type alias using storybook's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for storybook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Upstream provider answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),
}

impl Error {
    /// HTTP status reported by the upstream provider, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
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
