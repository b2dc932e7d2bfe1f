//! Integration Tests for the demo server
//!
//! Drives the full router, including the request-context middleware.

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cacheable::api::{create_router, AppState, TokenService};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, AppState) {
    let state = AppState::new(TokenService::new());
    (create_router(state.clone()), state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

// == Token Endpoint Tests ==

#[tokio::test]
async fn test_token_repeats_within_request() {
    let (app, state) = create_test_app();

    let (status, json) = get_json(app, "/token?audience=billing").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["audience"], "billing");
    assert_eq!(json["token"], json["repeated"]);
    assert_eq!(json["cached"], true);
    assert!(json["token"].as_str().unwrap().starts_with("billing."));
    assert_eq!(state.tokens.issued(), 1);
}

#[tokio::test]
async fn test_default_audience() {
    let (app, _) = create_test_app();

    let (status, json) = get_json(app, "/token").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["audience"], "default");
}

#[tokio::test]
async fn test_sequential_requests_get_fresh_tokens() {
    let (app, state) = create_test_app();

    let (_, first) = get_json(app.clone(), "/token").await;
    let (_, second) = get_json(app, "/token").await;

    assert_ne!(first["request_id"], second["request_id"]);
    assert_ne!(first["token"], second["token"]);
    assert_eq!(state.tokens.issued(), 2);
}

#[tokio::test]
async fn test_concurrent_requests_never_share_tokens() {
    let (app, state) = create_test_app();
    const REQUESTS: usize = 16;

    let handles: Vec<_> = (0..REQUESTS)
        .map(|_| tokio::spawn(get_json(app.clone(), "/token")))
        .collect();

    let mut tokens = HashSet::new();
    let mut request_ids = HashSet::new();
    for handle in handles {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["token"], json["repeated"], "second lookup must hit");
        tokens.insert(json["token"].as_str().unwrap().to_string());
        request_ids.insert(json["request_id"].as_u64().unwrap());
    }

    assert_eq!(tokens.len(), REQUESTS, "every request sees its own token");
    assert_eq!(request_ids.len(), REQUESTS);
    assert_eq!(state.tokens.issued(), REQUESTS as u64);
}

#[tokio::test]
async fn test_seeded_token_is_served_then_cleared() {
    let (app, state) = create_test_app();

    let (status, json) = get_json(app, "/token/seeded?audience=billing&token=billing.fixed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["seeded"], "billing.fixed");
    assert_eq!(json["served"], "billing.fixed");
    assert_eq!(json["cached_before_clear"], 1);
    assert_ne!(json["reissued"], "billing.fixed");
    assert_eq!(state.tokens.issued(), 1);
}

#[tokio::test]
async fn test_seed_does_not_outlive_its_request() {
    let (app, _) = create_test_app();

    let (_, seeded) = get_json(app.clone(), "/token/seeded?token=default.fixed").await;
    let (_, next) = get_json(app, "/token").await;

    assert_eq!(seeded["served"], "default.fixed");
    assert_ne!(next["token"], "default.fixed");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/set").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
