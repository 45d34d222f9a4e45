//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired memory store values at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
