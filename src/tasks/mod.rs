//! Background Tasks Module
//!
//! Housekeeping loops that run alongside the server.
//!
//! # Tasks
//! - Store sweep: drops in-process records whose store TTL has elapsed

mod sweep;

pub use sweep::spawn_sweep_task;
