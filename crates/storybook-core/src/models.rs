//! Core data models for storybook.
//!
//! These types are shared by the resolver, the inference client, and the
//! HTTP layer. Field names serialize in camelCase to match the browser
//! client.

use serde::{Deserialize, Serialize};

// =============================================================================
// STORY TYPES
// =============================================================================

/// A validated picture-book story: a title plus pages in reading order.
///
/// Values of this type only leave the resolver with a non-empty title and
/// at least one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub title: String,
    pub pages: Vec<Page>,
}

/// One narrative unit of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number. Some model replies omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Text shown to the reader.
    pub text: String,
    /// Instruction for the illustration step.
    pub image_prompt: String,
}

/// Who the story is about and what the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryInput {
    /// Free-text description of the main character (may be empty for the
    /// photo variant).
    pub character_description: String,
    /// Free-text request, e.g. "a story about visiting the sea".
    pub user_request: String,
    /// Optional photo (data URL or http URL) shown to the model.
    pub image_url: Option<String>,
}

// =============================================================================
// IMAGE TYPES
// =============================================================================

/// Result of an illustration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Hosted URL, or a `data:` URL when the provider returned base64.
    pub url: String,
    /// Prompt as rewritten by the provider, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Turn caller-supplied image data into a URL the upstream accepts.
///
/// Data URLs and http(s) URLs pass through; bare base64 gets a
/// `data:<mime>;base64,` prefix.
pub fn to_image_url(image_data: &str, default_mime: &str) -> String {
    let trimmed = image_data.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("data:") || lower.starts_with("http://") || lower.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("data:{};base64,{}", default_mime, trimmed)
    }
}
