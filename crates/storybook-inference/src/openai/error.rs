//! OpenAI-specific error handling.

use storybook_core::Error;

/// OpenAI-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Request too large.
    ContextLengthExceeded,
    /// Prompt or output rejected by the provider's safety system.
    ContentPolicyViolation,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (400, _) if error_type.contains("content_policy") => Self::ContentPolicyViolation,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }
}

/// Convert an OpenAI error into a storybook Error, keeping the status so
/// callers can relay it.
pub fn to_core_error(code: OpenAIErrorCode, status: u16, message: &str) -> Error {
    let message = match code {
        OpenAIErrorCode::AuthenticationError => format!("Authentication failed: {}", message),
        OpenAIErrorCode::RateLimitExceeded => format!("Rate limit exceeded: {}", message),
        OpenAIErrorCode::ModelNotFound => format!("Model not found: {}", message),
        OpenAIErrorCode::ContextLengthExceeded => format!("Context too long: {}", message),
        OpenAIErrorCode::ContentPolicyViolation => format!("Content rejected: {}", message),
        OpenAIErrorCode::ServerError => format!("Server error: {}", message),
        OpenAIErrorCode::Unknown => message.to_string(),
    };
    Error::Upstream { status, message }
}
