//! API Routes
//!
//! Configures the Axum router with all cache admin endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    derive_key_handler, entry_handler, health_handler, invalidate_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /keys` - Derive the key of a call
/// - `POST /invalidate` - Delete the entry of a call
/// - `GET /entries/:key` - Inspect a stored entry
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check with store ping
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/keys", post(derive_key_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/entries/:key", get(entry_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
