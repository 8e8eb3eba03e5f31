//! Story generation handler.
//!
//! Two request shapes are accepted:
//!
//! - text: `{ characterDescription, userRequest }`
//! - photo: `{ imageBase64 | photoBase64, userComment | userRequest, characterDescription? }`
//!
//! The handler always answers `200 { story }` once the request is valid.
//! Upstream failures and unusable model output are replaced by the
//! deterministic fallback story inside [`resolve_or_fallback`].

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use storybook_core::story::{story_system_prompt, story_user_prompt};
use storybook_core::{resolve_or_fallback, Story, StoryInput};

use super::{normalize_image, required};
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStoryRequest {
    pub character_description: Option<String>,
    pub user_request: Option<String>,
    #[serde(alias = "photoBase64")]
    pub image_base64: Option<String>,
    pub user_comment: Option<String>,
}

impl GenerateStoryRequest {
    /// Validate required fields and build the resolver input.
    pub fn into_story_input(self) -> Result<StoryInput, ApiError> {
        let has_photo = self
            .image_base64
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        if has_photo {
            let image_url = normalize_image(&required(self.image_base64, "imageBase64")?)?;
            let user_request = required(
                self.user_comment
                    .filter(|s| !s.trim().is_empty())
                    .or(self.user_request),
                "userComment",
            )?;
            return Ok(StoryInput {
                character_description: self.character_description.unwrap_or_default(),
                user_request,
                image_url: Some(image_url),
            });
        }

        Ok(StoryInput {
            character_description: required(self.character_description, "characterDescription")?,
            user_request: required(self.user_request, "userRequest")?,
            image_url: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateStoryResponse {
    pub story: Story,
}

pub async fn generate_story(
    State(state): State<AppState>,
    payload: Result<Json<GenerateStoryRequest>, JsonRejection>,
) -> Result<Json<GenerateStoryResponse>, ApiError> {
    let Json(req) = payload?;
    let input = req.into_story_input()?;

    let system = story_system_prompt();
    let prompt = story_user_prompt(&input);
    let start = Instant::now();

    let raw = match input.image_url.as_deref() {
        Some(image_url) => {
            state
                .story_backend
                .generate_with_image(&system, &prompt, image_url)
                .await
        }
        None => {
            state
                .story_backend
                .generate_with_system(&system, &prompt)
                .await
        }
    };

    let outcome = resolve_or_fallback(&input, raw);

    info!(
        subsystem = "api",
        component = "story",
        op = "generate_story",
        model = state.story_backend.model_name(),
        with_photo = input.image_url.is_some(),
        fallback = outcome.is_fallback(),
        page_count = outcome.story().pages.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Story generated"
    );

    Ok(Json(GenerateStoryResponse {
        story: outcome.into_story(),
    }))
}
