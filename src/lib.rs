//! Forecasty Cache - memoized upstream calls over a key-value store
//!
//! Derives stable keys from a callee and its arguments, serves stored results
//! within a freshness window and recomputes otherwise. Ships a Redis and an
//! in-process backing store plus a small admin HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CallArgs, MemoCache, StoreFailurePolicy};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_sweep_task;
