//! Response Cache - A dual-backend cache accessor for HTTP response segments
//!
//! Stores entry containers either in an owned in-memory store or in an
//! externally supplied persistent storage, reusing containers through a pool.

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;
pub mod tasks;

pub use cache::{BackendKind, Entry, EntryContainer, Manager};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{MemoryStore, Storage, StorageError, StoredValue};
pub use tasks::spawn_cleanup_task;
