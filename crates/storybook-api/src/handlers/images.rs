//! Illustration generation handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use storybook_core::{defaults, story::decorate_image_prompt, Error};

use super::required;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Generate one illustration in the shared picture-book style.
///
/// Upstream non-success statuses are relayed with the same status code.
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let Json(req) = payload?;
    let prompt = decorate_image_prompt(
        &required(req.prompt, "prompt")?,
        defaults::IMAGE_STYLE_SUFFIX,
    );

    let start = Instant::now();
    let image = state
        .image_backend
        .generate_image(&prompt)
        .await
        .map_err(|e| match e {
            Error::Upstream { status, message } => ApiError::from(Error::Upstream {
                status,
                message: format!("Image generation error: {}", message),
            }),
            other => ApiError::internal("Image generation failed", other),
        })?;

    info!(
        subsystem = "api",
        component = "images",
        op = "generate_image",
        model = state.image_backend.model_name(),
        prompt_len = prompt.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Image generated"
    );

    Ok(Json(GenerateImageResponse {
        image_url: image.url,
        revised_prompt: image.revised_prompt,
    }))
}
