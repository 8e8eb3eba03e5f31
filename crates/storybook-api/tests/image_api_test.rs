//! Router-level tests for the forwarding endpoints:
//! `POST /api/analyze-image` and `POST /api/generate-image`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use storybook_api::{build_router, AppState, ServerConfig};
use storybook_core::defaults;
use storybook_inference::mock::MockInferenceBackend;

fn app(backend: &MockInferenceBackend) -> Router {
    let state = AppState::new(Arc::new(backend.clone()));
    build_router(state, &ServerConfig::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// ANALYZE IMAGE
// =============================================================================

#[tokio::test]
async fn test_analyze_image_returns_description() {
    let backend = MockInferenceBackend::new().with_description("A baby with brown curls");

    let (status, body) = send(
        app(&backend),
        post_json(
            "/api/analyze-image",
            json!({ "imageData": "data:image/jpeg;base64,AAAA" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "A baby with brown curls");

    let calls = backend.get_calls();
    assert_eq!(calls[0].operation, "describe");
    assert_eq!(
        calls[0].image_url.as_deref(),
        Some("data:image/jpeg;base64,AAAA")
    );
}

#[tokio::test]
async fn test_analyze_image_missing_data_is_400() {
    let backend = MockInferenceBackend::new();

    let (status, body) = send(app(&backend), post_json("/api/analyze-image", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("imageData"));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_analyze_image_invalid_base64_is_400() {
    let backend = MockInferenceBackend::new();

    let (status, _) = send(
        app(&backend),
        post_json("/api/analyze-image", json!({ "imageData": "%%%" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_analyze_image_upstream_failure_is_500_with_details() {
    let backend = MockInferenceBackend::new().with_upstream_status(401, "Invalid API key");

    let (status, body) = send(
        app(&backend),
        post_json("/api/analyze-image", json!({ "imageData": "aGVsbG8=" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze image");
    assert!(body["details"].as_str().unwrap().contains("Invalid API key"));
}

// =============================================================================
// GENERATE IMAGE
// =============================================================================

#[tokio::test]
async fn test_generate_image_decorates_prompt_and_returns_url() {
    let backend = MockInferenceBackend::new().with_image_url("https://img.example/1.png");

    let (status, body) = send(
        app(&backend),
        post_json("/api/generate-image", json!({ "prompt": "a fox in a hat " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imageUrl"], "https://img.example/1.png");

    let calls = backend.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].input,
        format!("a fox in a hat{}", defaults::IMAGE_STYLE_SUFFIX)
    );
}

#[tokio::test]
async fn test_generate_image_missing_prompt_is_400() {
    let backend = MockInferenceBackend::new();

    let (status, body) = send(
        app(&backend),
        post_json("/api/generate-image", json!({ "prompt": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("prompt"));
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_generate_image_relays_upstream_status() {
    let backend =
        MockInferenceBackend::new().with_upstream_status(400, "Content rejected by safety system");

    let (status, body) = send(
        app(&backend),
        post_json("/api/generate-image", json!({ "prompt": "a fox" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Image generation error: "));
    assert!(error.contains("safety system"));
}

#[tokio::test]
async fn test_generate_image_transport_failure_is_500() {
    let backend = MockInferenceBackend::new().with_failure("connection reset");

    let (status, body) = send(
        app(&backend),
        post_json("/api/generate-image", json!({ "prompt": "a fox" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_forwarding_routes_reject_put() {
    let backend = MockInferenceBackend::new();

    for uri in ["/api/analyze-image", "/api/generate-image"] {
        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&backend), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }
}
