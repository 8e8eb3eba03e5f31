//! OpenAI-compatible inference backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use storybook_core::story::DESCRIBE_CHARACTER_PROMPT;
use storybook_core::{
    defaults, Error, GeneratedImage, GenerationBackend, ImageBackend, Result, VisionBackend,
};

use super::error::{to_core_error, OpenAIErrorCode};
use super::types::*;

/// Longest upstream error body kept in messages and logs.
const MAX_ERROR_BODY_LEN: usize = 2000;

/// Configuration for OpenAI-compatible backend.
///
/// Built once at startup and moved into the backend; handlers never read
/// the environment.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for story generation.
    pub story_model: String,
    /// Model to use for photo description.
    pub vision_model: String,
    /// Model to use for illustrations.
    pub image_model: String,
    /// Completion token cap for stories.
    pub story_max_tokens: u32,
    /// Completion token cap for photo descriptions.
    pub vision_max_tokens: u32,
    /// Illustration size, e.g. "1024x1024".
    pub image_size: String,
    /// Illustration quality ("standard" or "hd").
    pub image_quality: String,
    /// Illustration style ("vivid" or "natural").
    pub image_style: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retries after the first attempt for 429/5xx and transport failures.
    pub max_retries: u32,
    /// Linear backoff step between retries.
    pub retry_backoff_ms: u64,
    /// Skip TLS verification (for self-signed certs in local environments).
    pub skip_tls_verify: bool,
    /// HTTP-Referer header for OpenRouter.ai rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter.ai (optional).
    pub x_title: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            story_model: defaults::STORY_MODEL.to_string(),
            vision_model: defaults::VISION_MODEL.to_string(),
            image_model: defaults::IMAGE_MODEL.to_string(),
            story_max_tokens: defaults::STORY_MAX_TOKENS,
            vision_max_tokens: defaults::VISION_MAX_TOKENS,
            image_size: defaults::IMAGE_SIZE.to_string(),
            image_quality: defaults::IMAGE_QUALITY.to_string(),
            image_style: defaults::IMAGE_STYLE.to_string(),
            timeout_seconds: defaults::TIMEOUT_SECS,
            max_retries: defaults::MAX_RETRIES,
            retry_backoff_ms: defaults::RETRY_BACKOFF_MS,
            skip_tls_verify: false,
            http_referer: None,
            x_title: None,
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        fn var_or(name: &str, default: &str) -> String {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        }
        fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }

        Self {
            base_url: var_or("OPENAI_BASE_URL", defaults::OPENAI_URL),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            story_model: var_or("OPENAI_STORY_MODEL", defaults::STORY_MODEL),
            vision_model: var_or("OPENAI_VISION_MODEL", defaults::VISION_MODEL),
            image_model: var_or("OPENAI_IMAGE_MODEL", defaults::IMAGE_MODEL),
            story_max_tokens: parsed_or("OPENAI_STORY_MAX_TOKENS", defaults::STORY_MAX_TOKENS),
            vision_max_tokens: parsed_or("OPENAI_VISION_MAX_TOKENS", defaults::VISION_MAX_TOKENS),
            image_size: var_or("OPENAI_IMAGE_SIZE", defaults::IMAGE_SIZE),
            image_quality: var_or("OPENAI_IMAGE_QUALITY", defaults::IMAGE_QUALITY),
            image_style: var_or("OPENAI_IMAGE_STYLE", defaults::IMAGE_STYLE),
            timeout_seconds: parsed_or("OPENAI_TIMEOUT", defaults::TIMEOUT_SECS),
            max_retries: parsed_or("OPENAI_MAX_RETRIES", defaults::MAX_RETRIES),
            retry_backoff_ms: parsed_or("OPENAI_RETRY_BACKOFF_MS", defaults::RETRY_BACKOFF_MS),
            skip_tls_verify: std::env::var("OPENAI_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
            http_referer: std::env::var("OPENAI_HTTP_REFERER").ok(),
            x_title: std::env::var("OPENAI_X_TITLE").ok(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "OpenAI base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        for (name, value) in [
            ("story_model", &self.story_model),
            ("vision_model", &self.vision_model),
            ("image_model", &self.image_model),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("OpenAI {} cannot be empty", name)));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(Error::Config("OpenAI timeout must be non-zero".to_string()));
        }

        Ok(())
    }
}

/// A failed attempt and whether repeating it could help.
struct AttemptError {
    error: Error,
    retryable: bool,
}

/// OpenAI-compatible inference backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder =
            Client::builder().timeout(Duration::from_secs(config.timeout_seconds));

        if config.skip_tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, story={}, vision={}, image={}",
            config.base_url, config.story_model, config.vision_model, config.image_model
        );
        if config.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; upstream calls will be unauthenticated");
        }

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // Add OpenRouter-specific headers if configured
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    /// POST a JSON body, retrying retryable failures up to `max_retries` times.
    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.post_json_once(endpoint, body).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.retryable && attempt < max_attempts => {
                    let backoff = self.config.retry_backoff_ms * attempt as u64;
                    warn!(
                        subsystem = "inference",
                        component = "openai",
                        attempt,
                        backoff_ms = backoff,
                        error = %failure.error,
                        "Retrying upstream request"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn post_json_once<B, R>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> std::result::Result<R, AttemptError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .build_request(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError {
                retryable: e.is_timeout() || e.is_connect(),
                error: Error::Request(format!("Request failed: {}", e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (message, error_type) = match serde_json::from_str::<OpenAIErrorResponse>(&text) {
                Ok(body) => (
                    body.error.message,
                    body.error.code.or(body.error.error_type).unwrap_or_default(),
                ),
                Err(_) => (truncate_for_log(&text, MAX_ERROR_BODY_LEN), String::new()),
            };
            warn!(
                subsystem = "inference",
                component = "openai",
                upstream_status = status.as_u16(),
                error = %message,
                "Upstream returned non-success status"
            );
            let code = OpenAIErrorCode::from_response(status.as_u16(), &error_type);
            return Err(AttemptError {
                retryable: code.is_retryable(),
                error: to_core_error(code, status.as_u16(), &message),
            });
        }

        response.json::<R>().await.map_err(|e| AttemptError {
            retryable: false,
            error: Error::Inference(format!("Failed to parse response: {}", e)),
        })
    }

    async fn complete(
        &self,
        model: &str,
        max_tokens: u32,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: None,
            max_tokens: Some(max_tokens),
        };

        let result: ChatCompletionResponse = self.post_json("/chat/completions", &request).await?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("Completion returned no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "chat_completion",
            model = %model,
            response_len = content.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion finished"
        );
        Ok(content)
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total_len={}]", &s[..end], s.len())
}

fn with_system(system: &str, user: ChatMessage) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !system.is_empty() {
        messages.push(ChatMessage::system(system));
    }
    messages.push(user);
    messages
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(
            "Generating with model {}, prompt length: {}",
            self.config.story_model,
            prompt.len()
        );
        self.complete(
            &self.config.story_model,
            self.config.story_max_tokens,
            with_system(system, ChatMessage::user(prompt)),
        )
        .await
    }

    async fn generate_with_image(
        &self,
        system: &str,
        prompt: &str,
        image_url: &str,
    ) -> Result<String> {
        debug!(
            "Generating with model {} and inline image, prompt length: {}",
            self.config.story_model,
            prompt.len()
        );
        self.complete(
            &self.config.story_model,
            self.config.story_max_tokens,
            with_system(system, ChatMessage::user_with_image(prompt, image_url)),
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.config.story_model
    }
}

#[async_trait]
impl VisionBackend for OpenAIBackend {
    async fn describe_image(&self, image_url: &str, prompt: Option<&str>) -> Result<String> {
        let prompt = prompt.unwrap_or(DESCRIBE_CHARACTER_PROMPT);
        self.complete(
            &self.config.vision_model,
            self.config.vision_max_tokens,
            vec![ChatMessage::user_with_image(prompt, image_url)],
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.config.vision_model
    }
}

#[async_trait]
impl ImageBackend for OpenAIBackend {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = ImageGenerationRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.config.image_size.clone(),
            quality: Some(self.config.image_quality.clone()),
            style: Some(self.config.image_style.clone()),
        };

        let result: ImageGenerationResponse =
            self.post_json("/images/generations", &request).await?;

        let image = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("Image response contained no images".to_string()))?;

        let url = match (image.url, image.b64_json) {
            (Some(url), _) => url,
            (None, Some(b64)) => format!("data:image/png;base64,{}", b64),
            (None, None) => {
                return Err(Error::Inference(
                    "Image response contained neither url nor b64_json".to_string(),
                ))
            }
        };

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate_image",
            model = %self.config.image_model,
            "Image generated"
        );

        Ok(GeneratedImage {
            url,
            revised_prompt: image.revised_prompt,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.image_model
    }
}
