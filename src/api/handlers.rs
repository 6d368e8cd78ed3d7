//! API Handlers
//!
//! HTTP request handlers for each cache admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::MemoCache;
use crate::error::{CacheError, Result};
use crate::models::{
    CallRequest, EntryResponse, HealthResponse, InvalidateResponse, KeyResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared memoizing cache
    pub cache: Arc<MemoCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: MemoCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

fn validated(req: &CallRequest) -> Result<()> {
    match req.validate() {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for POST /keys
///
/// Derives the cache key of a call without touching the store.
pub async fn derive_key_handler(
    State(state): State<AppState>,
    Json(req): Json<CallRequest>,
) -> Result<Json<KeyResponse>> {
    validated(&req)?;
    let key = state.cache.derive_key(&req.callee, &req.call_args())?;
    Ok(Json(KeyResponse { key }))
}

/// Handler for POST /invalidate
///
/// Deletes the entry of a call, if present.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<CallRequest>,
) -> Result<Json<InvalidateResponse>> {
    validated(&req)?;
    let key = state.cache.invalidate(&req.callee, &req.call_args()).await?;
    info!(callee = %req.callee, key = %key, "Invalidated via API");
    Ok(Json(InvalidateResponse::new(key)))
}

/// Handler for GET /entries/:key
///
/// Reports a stored entry and its freshness.
pub async fn entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    match state.cache.inspect(&key).await? {
        Some(status) => Ok(Json(status.into())),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;
    Json(StatsResponse::new(
        cache.stats(),
        cache.freshness().num_seconds(),
    ))
}

/// Handler for GET /health
///
/// Pings the backing store; an unreachable store reports "degraded".
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.cache.store();
    let reachable = store.ping().await.is_ok();
    Json(HealthResponse::new(reachable, store.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use chrono::Duration;
    use serde_json::{json, Map};

    fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new(100, None));
        AppState::new(MemoCache::new(store, Duration::seconds(7200)))
    }

    fn request(callee: &str) -> CallRequest {
        CallRequest {
            callee: callee.to_string(),
            args: vec![json!(55.78), json!(37.63)],
            kwargs: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_derive_key_handler() {
        let state = test_state();
        let response = derive_key_handler(State(state), Json(request("get_forecast")))
            .await
            .unwrap();
        assert!(response.key.starts_with("func:get_forecast:"));
    }

    #[tokio::test]
    async fn test_entry_handler_after_fetch() {
        let state = test_state();
        let args = request("get_forecast").call_args();
        let _: serde_json::Value = state
            .cache
            .fetch_or_compute("get_forecast", &args, || async {
                Ok::<_, CacheError>(json!({"temp": 5}))
            })
            .await
            .unwrap();

        let key = state.cache.derive_key("get_forecast", &args).unwrap();
        let response = entry_handler(State(state), Path(key)).await.unwrap();
        assert!(response.fresh);
        assert_eq!(response.output, r#"{"temp":5}"#);
    }

    #[tokio::test]
    async fn test_entry_handler_missing() {
        let result = entry_handler(State(test_state()), Path("func:x:0".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();
        let response = invalidate_handler(State(state.clone()), Json(request("get_geo")))
            .await
            .unwrap();
        assert!(response.key.starts_with("func:get_geo:"));

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.invalidations, 1);
    }

    #[tokio::test]
    async fn test_invalid_request() {
        let result = derive_key_handler(State(test_state()), Json(request(""))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.store, "memory");
    }
}
