//! Prompt templates sent to the upstream model.

use crate::defaults::{STORY_MAX_PAGES, STORY_MIN_PAGES};
use crate::models::StoryInput;

/// Instruction used when describing an uploaded photo.
pub const DESCRIBE_CHARACTER_PROMPT: &str = "Look closely at this photo of a child and describe \
them as a picture-book character. Include hair color and style, eye color, clothing, and facial \
expression, written so an illustrator can reproduce the character consistently.";

/// System turn for story generation.
pub fn story_system_prompt() -> String {
    format!(
        "You write gentle picture-book stories for small children. \
Reply with a single JSON object and nothing else: no explanations, no Markdown.\n\
The object must have this shape:\n\
{{\n  \"title\": \"story title\",\n  \"pages\": [\n    {{\n      \"pageNumber\": 1,\n      \
\"text\": \"text shown on this page\",\n      \
\"imagePrompt\": \"detailed English prompt for illustrating this page\"\n    }}\n  ]\n}}\n\
Rules:\n\
- Write {}-{} pages.\n\
- The character is the hero of the story.\n\
- Keep the content kind and age-appropriate.\n\
- Every imagePrompt describes the same character appearance and one consistent art style.",
        STORY_MIN_PAGES, STORY_MAX_PAGES
    )
}

/// User turn for story generation.
pub fn story_user_prompt(input: &StoryInput) -> String {
    let mut prompt = String::new();

    if input.image_url.is_some() {
        prompt.push_str(
            "The attached photo shows the main character. Reflect their appearance in every imagePrompt.\n",
        );
    }

    let character = input.character_description.trim();
    if !character.is_empty() {
        prompt.push_str(&format!("Main character: {}\n", character));
    }

    prompt.push_str(&format!("Request: {}\n", input.user_request.trim()));
    prompt.push_str("Return only the JSON object.");
    prompt
}

/// Append the shared illustration style to a caller prompt.
pub fn decorate_image_prompt(prompt: &str, style_suffix: &str) -> String {
    format!("{}{}", prompt.trim(), style_suffix)
}
