//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each admin endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use forecasty_cache::{
    api::create_router,
    cache::{CallArgs, MemoCache, MemoryStore},
    AppState, CacheError,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    let store = Arc::new(MemoryStore::new(100, None));
    AppState::new(MemoCache::new(store, Duration::seconds(7200)))
}

fn create_test_app() -> Router {
    create_router(create_test_state())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn seed_forecast(state: &AppState) -> String {
    let args = CallArgs::new().arg(&55.78).unwrap().arg(&37.63).unwrap();
    let _: Value = state
        .cache
        .fetch_or_compute("get_forecast", &args, || async {
            Ok::<_, CacheError>(json!({"temp": 5}))
        })
        .await
        .unwrap();
    state.cache.derive_key("get_forecast", &args).unwrap()
}

// == Key Endpoint Tests ==

#[tokio::test]
async fn test_keys_endpoint_matches_library_key() {
    let state = create_test_state();
    let expected = state
        .cache
        .derive_key(
            "get_geo",
            &CallArgs::new().kwarg("latitude", &55.78).unwrap(),
        )
        .unwrap();

    let response = create_router(state)
        .oneshot(post_json(
            "/keys",
            json!({"callee": "get_geo", "kwargs": {"latitude": 55.78}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], expected);
}

#[tokio::test]
async fn test_keys_endpoint_kwarg_order_irrelevant() {
    let app = create_test_app();

    let first = app
        .clone()
        .oneshot(post_json(
            "/keys",
            json!({"callee": "f", "kwargs": {"a": 1, "b": {"x": 1, "y": 2}}}),
        ))
        .await
        .unwrap();
    let second = app
        .oneshot(post_json(
            "/keys",
            json!({"callee": "f", "kwargs": {"b": {"y": 2, "x": 1}, "a": 1}}),
        ))
        .await
        .unwrap();

    let first = body_to_json(first.into_body()).await;
    let second = body_to_json(second.into_body()).await;
    assert_eq!(first["key"], second["key"]);
}

#[tokio::test]
async fn test_empty_callee_request() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/keys", json!({"callee": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Callee"));
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/keys")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Entry Endpoint Tests ==

#[tokio::test]
async fn test_entry_endpoint_success() {
    let state = create_test_state();
    let key = seed_forecast(&state).await;

    let response = create_router(state)
        .oneshot(get(&format!("/entries/{}", key)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], key);
    assert_eq!(json["fresh"], true);
    assert_eq!(json["output"], r#"{"temp":5}"#);
}

#[tokio::test]
async fn test_entry_endpoint_not_found() {
    let app = create_test_app();

    let response = app.oneshot(get("/entries/func:nothing:00")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == Invalidate Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint_removes_entry() {
    let state = create_test_state();
    let key = seed_forecast(&state).await;
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/invalidate",
            json!({"callee": "get_forecast", "args": [55.78, 37.63]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], key);

    let response = app
        .oneshot(get(&format!("/entries/{}", key)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalidate_endpoint_absent_entry() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/invalidate", json!({"callee": "never_called"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// == Stats / Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let state = create_test_state();
    seed_forecast(&state).await;
    seed_forecast(&state).await;

    let response = create_router(state).oneshot(get("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["computations"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["freshness_secs"], 7200);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"], "memory");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let response = app.oneshot(get("/get/anything")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
