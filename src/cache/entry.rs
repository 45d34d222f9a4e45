//! Cache Entry Module
//!
//! Defines cached response segments and the container exchanged with backends.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Entry ==
/// One cached response representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Response payload
    pub body: Vec<u8>,
    /// Value of the `Content-Type` header
    pub content_type: Vec<u8>,
    /// Value of the `Content-Encoding` header
    pub content_encoding: Vec<u8>,
    /// HTTP status code
    pub status_code: u16,
    /// Absolute expiry instant, in the unit chosen by the caller
    pub expiration: u64,
    /// Remaining response headers
    pub headers: HashMap<String, Vec<u8>>,
    /// Slot in an external expiry-ordered heap.
    ///
    /// Owned and mutated only by that heap. Runtime-only: never serialized,
    /// so a decoded entry always starts at 0.
    #[serde(skip)]
    pub heap_index: usize,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry with a status code and body; everything else empty.
    pub fn new(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            status_code,
            ..Self::default()
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<Vec<u8>>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the content encoding.
    pub fn with_content_encoding(mut self, content_encoding: impl Into<Vec<u8>>) -> Self {
        self.content_encoding = content_encoding.into();
        self
    }

    /// Sets the absolute expiry instant.
    pub fn with_expiration(mut self, expiration: u64) -> Self {
        self.expiration = expiration;
        self
    }

    /// Adds or replaces a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

// == Entry Container ==
/// Named set of entries stored under one cache key.
///
/// This is the unit handed out by the pool and stored by the backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryContainer {
    pub segments: HashMap<String, Entry>,
}

impl EntryContainer {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry stored under `name`, if any.
    pub fn segment(&self, name: &str) -> Option<&Entry> {
        self.segments.get(name)
    }

    /// Adds or replaces the entry stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.segments.insert(name.into(), entry)
    }

    /// Returns true if the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    // == Clear ==
    /// Drops every entry while keeping the map allocation for reuse.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
