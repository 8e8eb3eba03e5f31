//! Photo description handler.
//!
//! Turns an uploaded photo into a picture-book character description that
//! the client can feed back into story generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use super::{normalize_image, required};
use crate::{ApiError, AppState};

/// Request body for describing a photo.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    /// Data URL, http(s) URL, or bare base64 (treated as PNG).
    pub image_data: Option<String>,
}

/// Response from photo description.
#[derive(Debug, Serialize)]
pub struct AnalyzeImageResponse {
    /// Character description written by the vision model.
    pub description: String,
}

/// Describe a photo as a picture-book character.
///
/// # Returns
/// - 200 OK with `{ description }`
/// - 400 Bad Request if `imageData` is missing or invalid base64
/// - 500 Internal Server Error with `{ error, details }` on any upstream failure
pub async fn analyze_image(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> Result<Json<AnalyzeImageResponse>, ApiError> {
    let Json(req) = payload?;
    let image_url = normalize_image(&required(req.image_data, "imageData")?)?;

    let start = Instant::now();
    let description = state
        .vision_backend
        .describe_image(&image_url, None)
        .await
        .map_err(|e| ApiError::internal("Failed to analyze image", e))?;

    info!(
        subsystem = "api",
        component = "vision",
        op = "analyze_image",
        model = state.vision_backend.model_name(),
        response_len = description.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Image analyzed"
    );

    Ok(Json(AnalyzeImageResponse { description }))
}
