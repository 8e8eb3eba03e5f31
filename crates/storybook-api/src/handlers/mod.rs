//! HTTP handlers for storybook-api.

pub mod health;
pub mod images;
pub mod story;
pub mod vision;

use base64::Engine;
use storybook_core::{defaults, models::to_image_url};

use crate::ApiError;

/// Method fallback for every route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Take a required string field, treating blank strings as absent.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required parameter: {}", field)))
}

/// Normalize caller image data into a URL the upstream model accepts.
///
/// `data:` and `http(s)://` URLs pass through. Anything else must be valid
/// standard base64 and is wrapped as a PNG data URL.
pub(crate) fn normalize_image(image_data: &str) -> Result<String, ApiError> {
    let trimmed = image_data.trim();
    let lower = trimmed.to_ascii_lowercase();
    let is_url =
        lower.starts_with("data:") || lower.starts_with("http://") || lower.starts_with("https://");

    if !is_url {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(trimmed)
            .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Image data is empty".into()));
        }
    }

    Ok(to_image_url(trimmed, defaults::IMAGE_MIME_TYPE))
}
