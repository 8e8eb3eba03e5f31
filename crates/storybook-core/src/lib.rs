//! # storybook-core
//!
//! Core types, traits, and story resolution for storybook.
//!
//! This crate provides the data model shared by the other storybook crates,
//! the backend traits the upstream client implements, and the resolver that
//! turns model output into a story (or a deterministic fallback).

pub mod defaults;
pub mod error;
pub mod models;
pub mod story;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use story::{resolve_or_fallback, InvalidStory, StoryOutcome};
pub use traits::*;
