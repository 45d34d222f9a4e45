//! Memory Store Module
//!
//! In-process key-value store holding live values with TTL expiration.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;

use crate::cache::{current_timestamp_ms, EntryContainer};
use crate::storage::stats::{StoreCounters, StoreStats};

// == Stored Value ==
/// A value held by the memory store.
#[derive(Debug, Clone)]
pub enum StoredValue {
    /// A live entry container, shared with readers
    Segments(Arc<EntryContainer>),
    /// Pre-serialized bytes stored through the raw path
    Raw(Bytes),
}

impl StoredValue {
    pub const SEGMENTS: &'static str = "entry container";
    pub const RAW: &'static str = "raw bytes";

    /// Short name of the variant, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Segments(_) => Self::SEGMENTS,
            StoredValue::Raw(_) => Self::RAW,
        }
    }
}

// == Slot ==
#[derive(Debug)]
struct Slot {
    value: StoredValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl Slot {
    fn new(value: StoredValue, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            // Round up so a sub-millisecond TTL still outlives the current tick
            let ttl_ms = u64::try_from(ttl.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);
            Some(current_timestamp_ms().saturating_add(ttl_ms))
        };
        Self { value, expires_at }
    }

    /// Expired once the current time reaches the expiration time.
    fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now >= expires)
    }
}

// == Memory Store ==
/// Concurrent in-memory store with per-key TTL.
///
/// Expired values are invisible to readers immediately and are removed either
/// lazily on access or by [`cleanup_expired`](Self::cleanup_expired).
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<String, Slot>,
    counters: StoreCounters,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    pub fn get(&self, key: &str) -> Option<StoredValue> {
        let now = current_timestamp_ms();
        let expired = match self.slots.get(key) {
            Some(slot) if !slot.is_expired(now) => {
                self.counters.record_hit();
                return Some(slot.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired && self.slots.remove_if(key, |_, slot| slot.is_expired(now)).is_some() {
            self.counters.record_expirations(1);
        }
        self.counters.record_miss();
        None
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous value and TTL.
    ///
    /// A zero `ttl` means the value never expires.
    pub fn set(&self, key: &str, value: StoredValue, ttl: Duration) {
        self.slots.insert(key.to_string(), Slot::new(value, ttl));
    }

    // == Delete ==
    /// Removes `key`. Returns true if a value was present.
    pub fn delete(&self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes all expired values and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut removed = 0;
        self.slots.retain(|_, slot| {
            if slot.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });

        self.counters.record_expirations(removed);
        removed
    }

    // == Length ==
    /// Returns the number of slots, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Stats ==
    pub fn stats(&self) -> StoreStats {
        self.counters.snapshot(self.slots.len())
    }
}
