//! # storybook-inference
//!
//! Upstream model clients for storybook.
//!
//! This crate provides:
//! - OpenAI-compatible implementation of the story, vision and image
//!   backend traits (feature `openai`)
//! - Bounded retry for rate-limited and server-side failures
//! - Mock backend for handler tests (feature `mock`)
//!
//! # Feature Flags
//!
//! - `openai` (default): Enable OpenAI-compatible backend
//! - `mock`: Expose [`mock::MockInferenceBackend`] to dependent crates
//! - `integration`: Enable live-provider tests
//!
//! # Example
//!
//! ```rust,no_run
//! use storybook_inference::OpenAIBackend;
//! use storybook_core::ImageBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let image = backend.generate_image("a snail reading a book").await.unwrap();
//!     println!("{}", image.url);
//! }
//! ```

#[cfg(feature = "openai")]
pub mod openai;

// Mock inference backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use storybook_core::*;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
