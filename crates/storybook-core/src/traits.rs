//! Core traits for storybook abstractions.
//!
//! These traits define the interfaces that concrete upstream clients
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::GeneratedImage;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate text with system context and one inlined image in the user turn.
    ///
    /// `image_url` is either a `data:` URL or a hosted image URL.
    async fn generate_with_image(
        &self,
        system: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for describing images using vision LLMs.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Describe an image, optionally with a custom prompt.
    async fn describe_image(&self, image_url: &str, prompt: Option<&str>) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text-to-image generation.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Render one image for the prompt.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
