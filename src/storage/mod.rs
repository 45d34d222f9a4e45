//! Storage Module
//!
//! Backend contracts: the externally supplied persistent storage and the
//! owned in-memory store.

mod memory;
mod stats;

pub use memory::{MemoryStore, StoredValue};
pub use stats::StoreStats;

use std::time::Duration;

// == Storage Error ==
/// Error type returned by [`Storage`] implementations.
pub type StorageError = Box<dyn std::error::Error + Send + Sync>;

// == Storage Trait ==
/// Persistent key-value service holding opaque bytes with a time-to-live.
///
/// Implementations must be safe to call concurrently. Every error is treated
/// as a soft failure by the cache.
pub trait Storage: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if there are none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` under `key`. A zero `ttl` means no expiry.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StorageError>;

    /// Removes `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}
