//! Story resolution: model reply in, usable story out.
//!
//! Falling back is the product rule for story generation: the reader always
//! gets a story. Failures are reported through logs and the
//! [`StoryOutcome::Fallback`] variant, never as an error.

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::models::{Story, StoryInput};

use super::extract::{extract_story, InvalidStory};
use super::fallback::fallback_story;

/// Result of resolving one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOutcome {
    /// The model reply parsed into a valid story.
    Parsed(Story),
    /// The reply was unusable; `story` is the deterministic fallback.
    Fallback { story: Story, reason: InvalidStory },
}

impl StoryOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, StoryOutcome::Fallback { .. })
    }

    pub fn story(&self) -> &Story {
        match self {
            StoryOutcome::Parsed(story) | StoryOutcome::Fallback { story, .. } => story,
        }
    }

    /// Collapse to the story handed to the caller.
    pub fn into_story(self) -> Story {
        match self {
            StoryOutcome::Parsed(story) | StoryOutcome::Fallback { story, .. } => story,
        }
    }
}

/// Resolve a model call result into a story, substituting the fallback
/// story on any upstream or parse failure.
pub fn resolve_or_fallback(input: &StoryInput, model_result: Result<String>) -> StoryOutcome {
    let reason = match model_result {
        Err(e) => InvalidStory::UpstreamFailed(e.to_string()),
        Ok(raw) => {
            debug!(
                subsystem = "story",
                component = "resolver",
                response_len = raw.len(),
                "Resolving model output"
            );
            trace!(subsystem = "story", component = "resolver", raw = %raw, "Raw model output");

            match extract_story(&raw) {
                Ok(story) => {
                    debug!(
                        subsystem = "story",
                        component = "resolver",
                        page_count = story.pages.len(),
                        "Model output parsed into story"
                    );
                    return StoryOutcome::Parsed(story);
                }
                Err(reason) => {
                    debug!(
                        subsystem = "story",
                        component = "resolver",
                        raw = %raw,
                        "Unusable model output"
                    );
                    reason
                }
            }
        }
    };

    warn!(
        subsystem = "story",
        component = "resolver",
        fallback_reason = %reason,
        user_request_len = input.user_request.len(),
        "Substituting fallback story"
    );

    StoryOutcome::Fallback {
        story: fallback_story(&input.character_description),
        reason,
    }
}
