//! Tests for router-wide behavior: health, CORS, request IDs, rate limiting.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use storybook_api::{
    build_router, middleware::build_rate_limiter, parse_allowed_origins, AppState, ServerConfig,
};
use storybook_inference::mock::MockInferenceBackend;

fn app_with(state: AppState, config: &ServerConfig) -> Router {
    build_router(state, config)
}

fn app() -> Router {
    let state = AppState::new(Arc::new(MockInferenceBackend::new()));
    app_with(state, &ServerConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_health_reports_version() {
    let response = app().oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_rejects_post() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let response = app().oneshot(get("/api/health")).await.unwrap();

    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header");
    assert_eq!(id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_incoming_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "client-supplied-id")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "client-supplied-id"
    );
}

#[tokio::test]
async fn test_cors_preflight_allows_whitelisted_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/generate-story")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    let methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
    assert!(!methods.contains("DELETE"));
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/generate-story")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_configured_origin_list_is_used() {
    let config = ServerConfig {
        allowed_origins: parse_allowed_origins("https://storybook.example.com"),
        ..Default::default()
    };
    let state = AppState::new(Arc::new(MockInferenceBackend::new()));
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "https://storybook.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app_with(state, &config).oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://storybook.example.com"
    );
}

#[tokio::test]
async fn test_wildcard_origin_config_builds_router() {
    let config = ServerConfig {
        allowed_origins: parse_allowed_origins("*"),
        ..Default::default()
    };
    let state = AppState::new(Arc::new(MockInferenceBackend::new()));
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "https://anywhere.example")
        .body(Body::empty())
        .unwrap();

    let response = app_with(state, &config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[test]
fn test_cors_allowed_origins_parsing() {
    let origins = parse_allowed_origins("https://storybook.example.com");
    assert_eq!(origins.len(), 1);

    let origins =
        parse_allowed_origins("https://storybook.example.com, http://localhost:3000 , https://x.io");
    assert_eq!(origins.len(), 3);
    assert_eq!(origins[1], "http://localhost:3000");

    // Empty string should use defaults
    let origins = parse_allowed_origins("");
    assert!(!origins.is_empty(), "Should have default origins");
}

#[tokio::test]
async fn test_rate_limit_returns_429_when_exhausted() {
    let state = AppState::new(Arc::new(MockInferenceBackend::new()))
        .with_rate_limiter(build_rate_limiter(1, 60).unwrap());
    let app = app_with(state, &ServerConfig::default());

    let first = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(second).await;
    assert_eq!(body["error"], "rate_limit_exceeded");
    assert!(body["error_description"].is_string());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..Default::default()
    };
    let backend = MockInferenceBackend::new();
    let state = AppState::new(Arc::new(backend.clone()));
    let body = serde_json::json!({ "prompt": "x".repeat(1024) }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate-image")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app_with(state, &config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(backend.total_calls(), 0);
}
