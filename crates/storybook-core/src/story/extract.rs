//! Extraction of a story object from raw model output.
//!
//! Model replies are pushed through an explicit sequence of states:
//!
//! ```text
//! RawText -> FenceStripped -> BraceExtracted -> Story | InvalidStory
//! ```
//!
//! Each transition is a plain function on a borrowed slice so it can be
//! tested on its own. No state allocates until the final parse.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Story;

/// Why a model reply could not be turned into a story.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStory {
    #[error("upstream call failed: {0}")]
    UpstreamFailed(String),

    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("top-level JSON value is not an object")]
    NotAnObject,

    #[error("missing or non-string title")]
    MissingTitle,

    #[error("title is empty")]
    EmptyTitle,

    #[error("missing or non-array pages")]
    MissingPages,

    #[error("pages is empty")]
    EmptyPages,

    #[error("page {index}: {reason}")]
    InvalidPage { index: usize, reason: String },

    #[error("page numbers are not strictly increasing at page {index}")]
    PageNumbersOutOfOrder { index: usize },
}

/// Model output exactly as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawText<'a>(&'a str);

/// Text with any surrounding Markdown code fence removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceStripped<'a>(&'a str);

/// The slice from the first `{` to the last `}` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceExtracted<'a>(&'a str);

impl<'a> RawText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Drop a leading code fence (with optional language tag such as
    /// `json`) and a trailing fence.
    ///
    /// Text that does not open with a fence is passed through untouched.
    pub fn strip_fences(self) -> FenceStripped<'a> {
        FenceStripped(strip_code_fence(self.0))
    }
}

impl<'a> FenceStripped<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Keep only the outermost brace-delimited span, discarding prose
    /// around it.
    pub fn extract_braces(self) -> Result<BraceExtracted<'a>, InvalidStory> {
        let start = self.0.find('{').ok_or(InvalidStory::NoJsonObject)?;
        let end = self.0.rfind('}').ok_or(InvalidStory::NoJsonObject)?;
        if start >= end {
            return Err(InvalidStory::NoJsonObject);
        }
        Ok(BraceExtracted(&self.0[start..=end]))
    }
}

impl<'a> BraceExtracted<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Parse the span and check the story shape.
    pub fn parse(self) -> Result<Story, InvalidStory> {
        let value: Value =
            serde_json::from_str(self.0).map_err(|e| InvalidStory::Malformed(e.to_string()))?;
        let object = value.as_object().ok_or(InvalidStory::NotAnObject)?;
        validate_shape(object)?;
        serde_json::from_value(value).map_err(|e| InvalidStory::Malformed(e.to_string()))
    }
}

/// Run every transition in order.
pub fn extract_story(raw: &str) -> Result<Story, InvalidStory> {
    RawText::new(raw).strip_fences().extract_braces()?.parse()
}

fn strip_code_fence(text: &str) -> &str {
    const FENCE: &str = "```";

    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return text;
    };

    // Language tag directly after the opener, e.g. ```json
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'))
        .unwrap_or(rest.len());
    let body = rest[tag_len..].trim_start();

    body.strip_suffix(FENCE).unwrap_or(body).trim_end()
}

fn validate_shape(object: &Map<String, Value>) -> Result<(), InvalidStory> {
    let title = object
        .get("title")
        .and_then(Value::as_str)
        .ok_or(InvalidStory::MissingTitle)?;
    if title.trim().is_empty() {
        return Err(InvalidStory::EmptyTitle);
    }

    let pages = object
        .get("pages")
        .and_then(Value::as_array)
        .ok_or(InvalidStory::MissingPages)?;
    if pages.is_empty() {
        return Err(InvalidStory::EmptyPages);
    }

    let mut last_number: Option<u64> = None;
    for (index, page) in pages.iter().enumerate() {
        let page = page.as_object().ok_or_else(|| InvalidStory::InvalidPage {
            index,
            reason: "not an object".to_string(),
        })?;

        for field in ["text", "imagePrompt"] {
            if !page.get(field).is_some_and(Value::is_string) {
                return Err(InvalidStory::InvalidPage {
                    index,
                    reason: format!("missing or non-string {}", field),
                });
            }
        }

        match page.get("pageNumber") {
            None | Some(Value::Null) => {}
            Some(number) => {
                let number = number
                    .as_u64()
                    .filter(|n| *n >= 1 && *n <= u32::MAX as u64)
                    .ok_or_else(|| InvalidStory::InvalidPage {
                        index,
                        reason: "pageNumber is not a positive integer".to_string(),
                    })?;
                if last_number.is_some_and(|last| number <= last) {
                    return Err(InvalidStory::PageNumbersOutOfOrder { index });
                }
                last_number = Some(number);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY_JSON: &str = r#"{"title":"T","pages":[{"text":"x","imagePrompt":"y"}]}"#;

    #[test]
    fn test_strip_fences_unfenced_is_noop() {
        let text = "  some text {\"a\": 1}\n";
        assert_eq!(RawText::new(text).strip_fences().as_str(), text);
    }

    #[test]
    fn test_strip_fences_json_tag() {
        let text = format!("```json\n{}\n```", STORY_JSON);
        assert_eq!(RawText::new(&text).strip_fences().as_str(), STORY_JSON);
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let text = format!("```\n{}\n```\n", STORY_JSON);
        assert_eq!(RawText::new(&text).strip_fences().as_str(), STORY_JSON);
    }

    #[test]
    fn test_strip_fences_uppercase_tag() {
        let text = format!("```JSON {}```", STORY_JSON);
        assert_eq!(RawText::new(&text).strip_fences().as_str(), STORY_JSON);
    }

    #[test]
    fn test_strip_fences_missing_closing_fence() {
        let text = format!("```json\n{}", STORY_JSON);
        assert_eq!(RawText::new(&text).strip_fences().as_str(), STORY_JSON);
    }

    #[test]
    fn test_strip_fences_twice_is_stable() {
        let text = format!("```json\n{}\n```", STORY_JSON);
        let once = RawText::new(&text).strip_fences().as_str();
        let twice = RawText::new(once).strip_fences().as_str();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extract_braces_discards_prose() {
        let text = format!("noise {} trailing", STORY_JSON);
        let extracted = RawText::new(&text)
            .strip_fences()
            .extract_braces()
            .unwrap();
        assert_eq!(extracted.as_str(), STORY_JSON);
    }

    #[test]
    fn test_extract_braces_without_object() {
        let result = RawText::new("Sorry, I cannot help with that.")
            .strip_fences()
            .extract_braces();
        assert_eq!(result, Err(InvalidStory::NoJsonObject));
    }

    #[test]
    fn test_extract_braces_reversed_order() {
        let result = RawText::new("} backwards {").strip_fences().extract_braces();
        assert_eq!(result, Err(InvalidStory::NoJsonObject));
    }

    #[test]
    fn test_parse_valid_story() {
        let story = extract_story(STORY_JSON).unwrap();
        assert_eq!(story.title, "T");
        assert_eq!(story.pages.len(), 1);
        assert_eq!(story.pages[0].text, "x");
        assert_eq!(story.pages[0].image_prompt, "y");
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = extract_story(r#"{"title": "T", "pages": [}"#);
        assert!(matches!(result, Err(InvalidStory::Malformed(_))));
    }

    #[test]
    fn test_parse_missing_pages() {
        assert_eq!(
            extract_story(r#"{"title":"T"}"#),
            Err(InvalidStory::MissingPages)
        );
    }

    #[test]
    fn test_parse_empty_pages() {
        assert_eq!(
            extract_story(r#"{"title":"T","pages":[]}"#),
            Err(InvalidStory::EmptyPages)
        );
    }

    #[test]
    fn test_parse_missing_title() {
        assert_eq!(
            extract_story(r#"{"pages":[{"text":"x","imagePrompt":"y"}]}"#),
            Err(InvalidStory::MissingTitle)
        );
    }

    #[test]
    fn test_parse_blank_title() {
        assert_eq!(
            extract_story(r#"{"title":"  ","pages":[{"text":"x","imagePrompt":"y"}]}"#),
            Err(InvalidStory::EmptyTitle)
        );
    }

    #[test]
    fn test_parse_page_without_image_prompt() {
        let result = extract_story(r#"{"title":"T","pages":[{"text":"x"}]}"#);
        assert!(matches!(
            result,
            Err(InvalidStory::InvalidPage { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_page_not_object() {
        let result = extract_story(r#"{"title":"T","pages":["just text"]}"#);
        assert!(matches!(
            result,
            Err(InvalidStory::InvalidPage { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_page_numbers_increasing() {
        let json = r#"{"title":"T","pages":[
            {"pageNumber":1,"text":"a","imagePrompt":"b"},
            {"pageNumber":2,"text":"c","imagePrompt":"d"}
        ]}"#;
        let story = extract_story(json).unwrap();
        assert_eq!(story.pages[1].page_number, Some(2));
    }

    #[test]
    fn test_parse_duplicate_page_numbers() {
        let json = r#"{"title":"T","pages":[
            {"pageNumber":1,"text":"a","imagePrompt":"b"},
            {"pageNumber":1,"text":"c","imagePrompt":"d"}
        ]}"#;
        assert_eq!(
            extract_story(json),
            Err(InvalidStory::PageNumbersOutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_parse_zero_page_number() {
        let json = r#"{"title":"T","pages":[{"pageNumber":0,"text":"a","imagePrompt":"b"}]}"#;
        assert!(matches!(
            extract_story(json),
            Err(InvalidStory::InvalidPage { index: 0, .. })
        ));
    }

    #[test]
    fn test_parse_null_page_number_allowed() {
        let json = r#"{"title":"T","pages":[{"pageNumber":null,"text":"a","imagePrompt":"b"}]}"#;
        let story = extract_story(json).unwrap();
        assert_eq!(story.pages[0].page_number, None);
    }

    #[test]
    fn test_parse_array_top_level() {
        // Braces inside an array still extract to an object slice
        let result = extract_story(r#"[{"title":"T"}]"#);
        assert_eq!(result, Err(InvalidStory::MissingPages));
    }

    #[test]
    fn test_parse_keeps_text_unchanged() {
        let json = r#"{"title":" Spaced ","pages":[{"text":"  a  ","imagePrompt":"b "}]}"#;
        let story = extract_story(json).unwrap();
        assert_eq!(story.title, " Spaced ");
        assert_eq!(story.pages[0].text, "  a  ");
        assert_eq!(story.pages[0].image_prompt, "b ");
    }
}
