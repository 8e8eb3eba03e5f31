//! HTTP error type and its JSON rendering.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request fields. Never reaches upstream.
    BadRequest(String),
    MethodNotAllowed,
    /// Upstream answered with a non-success status that is relayed as-is.
    Upstream { status: StatusCode, message: String },
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn internal(error: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Internal {
            error: error.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<storybook_core::Error> for ApiError {
    fn from(err: storybook_core::Error) -> Self {
        match err {
            storybook_core::Error::Upstream { status, message } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            other => ApiError::Internal {
                error: "Internal server error".to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::BadRequest(msg) => serde_json::json!({ "error": msg }),
            ApiError::MethodNotAllowed => serde_json::json!({ "error": "Method not allowed" }),
            ApiError::Upstream { message, .. } => serde_json::json!({ "error": message }),
            ApiError::Internal { error, details } => {
                tracing::error!(
                    error = %error,
                    details = details.as_deref().unwrap_or(""),
                    "Request failed"
                );
                match details {
                    Some(details) => serde_json::json!({ "error": error, "details": details }),
                    None => serde_json::json!({ "error": error }),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
