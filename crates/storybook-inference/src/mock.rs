//! Mock inference backend for deterministic testing.
//!
//! Implements every backend trait with canned replies and records each call,
//! so handlers can be exercised without a network.
//!
//! ## Usage
//!
//! ```rust
//! use storybook_inference::mock::MockInferenceBackend;
//! use storybook_core::GenerationBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend =
//!         MockInferenceBackend::new().with_fixed_response(r#"{"title":"T","pages":[]}"#);
//!
//!     let reply = backend.generate_with_system("sys", "prompt").await.unwrap();
//!     assert!(reply.contains("title"));
//!     assert_eq!(backend.call_count("generate"), 1);
//! }
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use storybook_core::{
    Error, GeneratedImage, GenerationBackend, ImageBackend, Result, VisionBackend,
};

/// Mock inference backend for testing.
#[derive(Clone)]
pub struct MockInferenceBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// `(needle, output)` pairs, checked in registration order.
    fixed_responses: Vec<(String, String)>,
    default_response: String,
    description: String,
    image_url: String,
    latency_ms: u64,
    failure: Option<MockFailure>,
}

#[derive(Debug, Clone)]
struct MockFailure {
    status: Option<u16>,
    message: String,
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self.status {
            Some(status) => Error::Upstream {
                status,
                message: self.message.clone(),
            },
            None => Error::Request(self.message.clone()),
        }
    }
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
    pub image_url: Option<String>,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fixed_responses: Vec::new(),
            default_response: "Mock response".to_string(),
            description: "A small child with curly brown hair and a yellow raincoat".to_string(),
            image_url: "https://images.example.com/mock.png".to_string(),
            latency_ms: 0,
            failure: None,
        }
    }
}

impl MockInferenceBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a fixed response for generation requests.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `output` for any generation prompt containing `needle`.
    ///
    /// When several needles match, the earliest registered one wins.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .push((needle.into(), output.into()));
        self
    }

    /// Set the reply for photo description requests.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).description = description.into();
        self
    }

    /// Set the URL returned by image generation.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).image_url = url.into();
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Fail every call with a transport-style error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(MockFailure {
            status: None,
            message: message.into(),
        });
        self
    }

    /// Fail every call as if the upstream answered with `status`.
    pub fn with_upstream_status(mut self, status: u16, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(MockFailure {
            status: Some(status),
            message: message.into(),
        });
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    /// Total number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.log().len()
    }

    /// Number of calls for one operation ("generate", "describe" or "image").
    pub fn call_count(&self, operation: &str) -> usize {
        self.log()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn record(&self, operation: &str, input: &str, image_url: Option<&str>) -> Result<()> {
        self.log().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
            image_url: image_url.map(str::to_string),
            timestamp: std::time::Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match &self.config.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn response_for(&self, prompt: &str) -> String {
        self.config
            .fixed_responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| self.config.default_response.clone())
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockInferenceBackend {
    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.record("generate", prompt, None).await?;
        Ok(self.response_for(prompt))
    }

    async fn generate_with_image(
        &self,
        _system: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String> {
        self.record("generate", prompt, Some(image_url)).await?;
        Ok(self.response_for(prompt))
    }

    fn model_name(&self) -> &str {
        "mock-story"
    }
}

#[async_trait]
impl VisionBackend for MockInferenceBackend {
    async fn describe_image(&self, image_url: &str, prompt: Option<&str>) -> Result<String> {
        self.record("describe", prompt.unwrap_or_default(), Some(image_url))
            .await?;
        Ok(self.config.description.clone())
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

#[async_trait]
impl ImageBackend for MockInferenceBackend {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        self.record("image", prompt, None).await?;
        Ok(GeneratedImage {
            url: self.config.image_url.clone(),
            revised_prompt: None,
        })
    }

    fn model_name(&self) -> &str {
        "mock-image"
    }
}
