//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `POST /keys` - Derive the key of a call
//! - `POST /invalidate` - Delete the entry of a call
//! - `GET /entries/:key` - Inspect a stored entry
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
