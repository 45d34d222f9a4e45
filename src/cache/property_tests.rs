//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the manager against a plain map model on both backends.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;

use crate::cache::{Entry, EntryContainer, Manager};
use crate::storage::{Storage, StorageError};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

/// Persistent backend double with no expiry.
#[derive(Default)]
struct MapStorage {
    data: DashMap<String, Vec<u8>>,
}

impl Storage for MapStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }
}

fn managers() -> [Manager; 2] {
    [
        Manager::new(None),
        Manager::new(Some(Arc::new(MapStorage::default()))),
    ]
}

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_/]{1,32}"
}

/// Generates entries with arbitrary payloads and headers
fn entry_strategy() -> impl Strategy<Value = Entry> {
    (
        prop::collection::vec(any::<u8>(), 0..128),
        "[a-z/+-]{0,24}",
        prop::sample::select(vec!["", "gzip", "br"]),
        100u16..600,
        any::<u64>(),
        prop::collection::hash_map("[A-Za-z-]{1,16}", prop::collection::vec(any::<u8>(), 0..32), 0..4),
    )
        .prop_map(|(body, ctype, cencoding, status, exp, headers)| Entry {
            body,
            content_type: ctype.into_bytes(),
            content_encoding: cencoding.as_bytes().to_vec(),
            status_code: status,
            expiration: exp,
            headers,
            heap_index: 0,
        })
}

fn container_strategy() -> impl Strategy<Value = EntryContainer> {
    prop::collection::hash_map("[a-z0-9_]{1,12}", entry_strategy(), 0..4)
        .prop_map(|segments| EntryContainer { segments })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, container: EntryContainer },
    SetRaw { key: String, raw: Vec<u8> },
    Get { key: String },
    GetRaw { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // A small key space so operations collide
    let key = || prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string);
    prop_oneof![
        (key(), container_strategy()).prop_map(|(key, container)| CacheOp::Set { key, container }),
        (key(), prop::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(key, raw)| CacheOp::SetRaw { key, raw }),
        key().prop_map(|key| CacheOp::Get { key }),
        key().prop_map(|key| CacheOp::GetRaw { key }),
        key().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// What the model expects to find under a key.
#[derive(Debug, Clone)]
enum Expected {
    Segments(EntryContainer),
    Raw(Vec<u8>),
}

fn filled(manager: &Manager, container: &EntryContainer) -> Arc<EntryContainer> {
    let mut acquired = manager.acquire();
    Arc::make_mut(&mut acquired)
        .segments
        .extend(container.segments.clone());
    acquired
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a container and reading it back before expiry yields the same segments.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), container in container_strategy()) {
        for manager in managers() {
            manager.set(&key, filled(&manager, &container), TEST_TTL);

            let found = manager.get(&key);
            prop_assert_eq!(&found.segments, &container.segments);
        }
    }

    // A key that was never set reads as an empty container.
    #[test]
    fn prop_miss_is_empty(key in key_strategy()) {
        for manager in managers() {
            prop_assert!(manager.get(&key).is_empty());
            prop_assert!(manager.get_raw(&key).is_none());
        }
    }

    // Raw bytes come back byte-identical.
    #[test]
    fn prop_raw_roundtrip(key in key_strategy(), raw in prop::collection::vec(any::<u8>(), 0..256)) {
        for manager in managers() {
            manager.set_raw(&key, Bytes::from(raw.clone()), TEST_TTL);

            let found = manager.get_raw(&key);
            prop_assert_eq!(found.as_deref(), Some(raw.as_slice()));
        }
    }

    // After a delete both access paths miss.
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), container in container_strategy()) {
        for manager in managers() {
            manager.set(&key, filled(&manager, &container), TEST_TTL);
            manager.del(&key);

            prop_assert!(manager.get(&key).is_empty());
            prop_assert!(manager.get_raw(&key).is_none());
        }
    }

    // Any interleaving of operations matches a last-write-wins map, and every
    // container fresh out of the pool is empty.
    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        for manager in managers() {
            let mut model: HashMap<String, Expected> = HashMap::new();

            for op in ops.clone() {
                match op {
                    CacheOp::Set { key, container } => {
                        prop_assert!(manager.acquire().is_empty());
                        manager.set(&key, filled(&manager, &container), TEST_TTL);
                        model.insert(key, Expected::Segments(container));
                    }
                    CacheOp::SetRaw { key, raw } => {
                        manager.set_raw(&key, Bytes::from(raw.clone()), TEST_TTL);
                        model.insert(key, Expected::Raw(raw));
                    }
                    CacheOp::Get { key } => {
                        let found = manager.get(&key);
                        match model.get(&key) {
                            Some(Expected::Segments(c)) => {
                                prop_assert_eq!(&found.segments, &c.segments);
                            }
                            // Raw bytes on the persistent backend decode only
                            // when they happen to be a valid container
                            Some(Expected::Raw(_)) if manager.pooling_active() => {
                                prop_assert!(found.is_empty());
                            }
                            Some(Expected::Raw(_)) => {}
                            None => prop_assert!(found.is_empty()),
                        }
                        manager.release(found);
                    }
                    CacheOp::GetRaw { key } => {
                        let found = manager.get_raw(&key);
                        match model.get(&key) {
                            Some(Expected::Raw(raw)) => {
                                prop_assert_eq!(found.as_deref(), Some(raw.as_slice()));
                            }
                            // Memory backend never hands a container out as bytes
                            Some(Expected::Segments(_)) if manager.pooling_active() => {
                                prop_assert!(found.is_none());
                            }
                            Some(Expected::Segments(_)) => prop_assert!(found.is_some()),
                            None => prop_assert!(found.is_none()),
                        }
                    }
                    CacheOp::Delete { key } => {
                        manager.del(&key);
                        model.remove(&key);
                    }
                }
            }
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once the TTL elapses the memory backend reports a miss.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), container in container_strategy()) {
        let manager = Manager::new(None);

        manager.set(&key, filled(&manager, &container), Duration::from_millis(100));
        prop_assert_eq!(&manager.get(&key).segments, &container.segments);

        std::thread::sleep(Duration::from_millis(150));

        prop_assert!(manager.get(&key).is_empty());
    }
}
