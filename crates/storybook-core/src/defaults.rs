//! Centralized default constants for storybook.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// UPSTREAM PROVIDER
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Model used for story generation (multimodal, follows JSON instructions well).
pub const STORY_MODEL: &str = "gpt-4o";

/// Model used for photo description.
pub const VISION_MODEL: &str = "gpt-4o-mini";

/// Model used for illustration generation.
pub const IMAGE_MODEL: &str = "dall-e-3";

/// Completion token cap for story generation.
pub const STORY_MAX_TOKENS: u32 = 2000;

/// Completion token cap for photo description.
pub const VISION_MAX_TOKENS: u32 = 500;

/// Request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 120;

/// Retries after the first attempt for retryable upstream failures.
pub const MAX_RETRIES: u32 = 0;

/// Linear backoff step between retries, in milliseconds.
pub const RETRY_BACKOFF_MS: u64 = 500;

// =============================================================================
// IMAGE GENERATION
// =============================================================================

/// Output size requested from the image endpoint.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Render quality requested from the image endpoint.
pub const IMAGE_QUALITY: &str = "standard";

/// Render style requested from the image endpoint.
pub const IMAGE_STYLE: &str = "vivid";

/// Suffix appended to every caller prompt so illustrations share one look.
pub const IMAGE_STYLE_SUFFIX: &str =
    ", children's picture book illustration, soft watercolor, warm pastel colors, gentle lighting";

/// MIME type assumed when a caller sends bare base64 without a data URL prefix.
pub const IMAGE_MIME_TYPE: &str = "image/png";

// =============================================================================
// STORY
// =============================================================================

/// Character used by the fallback story when the caller gave no description.
pub const FALLBACK_CHARACTER: &str = "a cheerful little child with round cheeks";

/// Title of the fallback story.
pub const FALLBACK_TITLE: &str = "A Little Adventure";

/// Lower bound on pages requested from the model.
pub const STORY_MIN_PAGES: usize = 5;

/// Upper bound on pages requested from the model.
pub const STORY_MAX_PAGES: usize = 8;

// =============================================================================
// HTTP SERVER
// =============================================================================

/// Bind address.
pub const HOST: &str = "0.0.0.0";

/// Listen port.
pub const PORT: u16 = 3000;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is unset or empty.
pub const ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Requests allowed per rate limit period.
pub const RATE_LIMIT_REQUESTS: u32 = 60;

/// Rate limit period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum request body size. Inlined photos make bodies large.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;
