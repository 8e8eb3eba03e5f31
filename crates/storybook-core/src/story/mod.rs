//! Story generation support: prompts, extraction, fallback, resolution.

pub mod extract;
pub mod fallback;
pub mod prompt;
pub mod resolver;

pub use extract::{extract_story, BraceExtracted, FenceStripped, InvalidStory, RawText};
pub use fallback::fallback_story;
pub use prompt::{
    decorate_image_prompt, story_system_prompt, story_user_prompt, DESCRIBE_CHARACTER_PROMPT,
};
pub use resolver::{resolve_or_fallback, StoryOutcome};
