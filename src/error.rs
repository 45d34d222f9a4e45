//! Error types for the response cache
//!
//! Provides the error taxonomy and the single policy point where errors are
//! turned into cache misses or skipped writes.

use std::fmt::Display;

use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::StorageError;

// == Cache Error Enum ==
/// Every failure the cache can run into.
///
/// None of these ever reach callers of [`Manager`](crate::cache::Manager):
/// they are logged and replaced by a fallback in [`degrade_on_error`].
#[derive(Error, Debug)]
pub enum CacheError {
    /// Persistent backend was unavailable or failed transiently
    #[error("Storage backend error: {0}")]
    Storage(#[from] StorageError),

    /// Stored bytes could not be decoded into an entry container
    #[error("Decode failed: {0}")]
    Decode(#[source] bincode::Error),

    /// Entry container could not be encoded
    #[error("Encode failed: {0}")]
    Encode(#[source] bincode::Error),

    /// Memory store holds a value of another shape than the one requested
    #[error("Type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl CacheError {
    /// Misses and type mismatches are routine; backend and encode failures are not.
    fn is_routine(&self) -> bool {
        matches!(self, CacheError::Decode(_) | CacheError::TypeMismatch { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Degrade On Error ==
/// Unwraps `result`, or logs the error and returns `fallback()`.
///
/// The cache is never a source of truth, so a miss or a skipped write is
/// always a safe answer. All error swallowing in the crate goes through here.
pub fn degrade_on_error<T, F>(op: &str, key: impl Display, result: Result<T>, fallback: F) -> T
where
    F: FnOnce() -> T,
{
    match result {
        Ok(value) => value,
        Err(err) => {
            if err.is_routine() {
                debug!(op, %key, error = %err, "cache operation degraded");
            } else {
                warn!(op, %key, error = %err, "cache operation degraded");
            }
            fallback()
        }
    }
}
