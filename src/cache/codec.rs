//! Codec Module
//!
//! Binary encoding of entry containers for the persistent backend.

use bincode::Options;

use crate::cache::EntryContainer;
use crate::config::DEFAULT_MAX_ENCODED_SIZE;
use crate::error::{CacheError, Result};

// == Codec ==
/// Encodes and decodes [`EntryContainer`]s with a size limit.
///
/// Uses varint integers and rejects trailing bytes, so foreign or truncated
/// payloads fail to decode instead of yielding a partial container.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    limit: u64,
}

impl Codec {
    /// Creates a codec that refuses payloads larger than `limit` bytes.
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new().with_limit(self.limit)
    }

    // == Encode ==
    pub fn encode(&self, container: &EntryContainer) -> Result<Vec<u8>> {
        self.options()
            .serialize(container)
            .map_err(CacheError::Encode)
    }

    // == Decode Into ==
    /// Decodes `raw` and moves its entries into `container`.
    ///
    /// The payload is decoded into a fresh map first and then merged, so
    /// `container` is left untouched on error.
    pub fn decode_into(&self, raw: &[u8], container: &mut EntryContainer) -> Result<()> {
        let decoded: EntryContainer = self
            .options()
            .deserialize(raw)
            .map_err(CacheError::Decode)?;
        container.segments.extend(decoded.segments);
        Ok(())
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENCODED_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Entry;

    fn sample() -> EntryContainer {
        let mut container = EntryContainer::new();
        container.insert(
            "GET_/index",
            Entry::new(200, "<html></html>")
                .with_content_type("text/html")
                .with_content_encoding("br")
                .with_expiration(1_700_000_000)
                .with_header("Etag", "\"abc\""),
        );
        container.insert("GET_/index_body", Entry::new(304, Vec::<u8>::new()));
        container
    }

    #[test]
    fn test_encode_then_decode_preserves_fields() {
        let codec = Codec::default();
        let original = sample();

        let raw = codec.encode(&original).unwrap();
        let mut decoded = EntryContainer::new();
        codec.decode_into(&raw, &mut decoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_heap_index_is_not_persisted() {
        let codec = Codec::default();
        let mut original = EntryContainer::new();
        let mut entry = Entry::new(200, "x");
        entry.heap_index = 17;
        original.insert("v1", entry);

        let raw = codec.encode(&original).unwrap();
        let mut decoded = EntryContainer::new();
        codec.decode_into(&raw, &mut decoded).unwrap();

        assert_eq!(decoded.segment("v1").unwrap().heap_index, 0);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let codec = Codec::default();
        let mut container = EntryContainer::new();

        let result = codec.decode_into(b"\xff\xff\xff\xff\xff not a container", &mut container);

        assert!(matches!(result, Err(CacheError::Decode(_))));
        assert!(container.is_empty());
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let codec = Codec::default();
        let mut raw = codec.encode(&sample()).unwrap();
        raw.push(0);

        let mut container = EntryContainer::new();
        assert!(codec.decode_into(&raw, &mut container).is_err());
    }

    #[test]
    fn test_size_limit_applies_to_encode() {
        let codec = Codec::new(16);
        let mut container = EntryContainer::new();
        container.insert("big", Entry::new(200, vec![0u8; 64]));

        assert!(matches!(codec.encode(&container), Err(CacheError::Encode(_))));
    }
}
