//! storybook-api - HTTP boundary for storybook.
//!
//! Builds the axum router shared by the binary and the integration tests.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use storybook_core::{GenerationBackend, ImageBackend, VisionBackend};

pub use config::{parse_allowed_origins, ServerConfig};
pub use error::ApiError;
use handlers::{health, images, method_not_allowed, story, vision};
use middleware::{rate_limit_middleware, GlobalRateLimiter, MakeRequestUuidV7};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub story_backend: Arc<dyn GenerationBackend>,
    pub vision_backend: Arc<dyn VisionBackend>,
    pub image_backend: Arc<dyn ImageBackend>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// State backed by one client that serves all three operations.
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: GenerationBackend + VisionBackend + ImageBackend + 'static,
    {
        Self {
            story_backend: backend.clone(),
            vision_backend: backend.clone(),
            image_backend: backend,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: GlobalRateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }
}

/// Build the application router with all middleware applied.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(
            "/api/analyze-image",
            post(vision::analyze_image).fallback(method_not_allowed),
        )
        .route(
            "/api/generate-image",
            post(images::generate_image).fallback(method_not_allowed),
        )
        .route(
            "/api/generate-story",
            post(story::generate_story).fallback(method_not_allowed),
        )
        .route(
            "/api/health",
            get(health::health_check).fallback(method_not_allowed),
        )
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        // Inlined photos exceed axum's 2 MB extractor default
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}
