//! OpenAI-compatible inference backend.
//!
//! This module provides an upstream client that works with any
//! OpenAI-compatible API endpoint, including:
//!
//! - OpenAI cloud API
//! - Azure OpenAI
//! - OpenRouter
//! - LocalAI / LM Studio (chat and vision only)
//!
//! # Example
//!
//! ```rust,no_run
//! use storybook_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use storybook_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     // From environment variables
//!     let backend = OpenAIBackend::from_env().unwrap();
//!
//!     // Or with custom config
//!     let config = OpenAIConfig {
//!         base_url: "https://openrouter.ai/api/v1".to_string(),
//!         api_key: Some("sk-...".to_string()),
//!         story_model: "openai/gpt-4o".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!
//!     let reply = backend
//!         .generate_with_system("You write picture books.", "A story about a snail.")
//!         .await
//!         .unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{to_core_error, OpenAIErrorCode};
pub use types::*;
