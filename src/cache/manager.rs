//! Cache Manager Module
//!
//! Uniform get/set/delete over the persistent and the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::codec::Codec;
use crate::cache::pool::{ContainerPool, PoolStats};
use crate::cache::EntryContainer;
use crate::config::Config;
use crate::error::{degrade_on_error, CacheError};
use crate::storage::{MemoryStore, Storage, StoreStats, StoredValue};
use crate::tasks::spawn_cleanup_task;

// == Backend ==
/// The single active backend, chosen at construction.
enum Backend {
    /// Externally supplied storage holding serialized bytes
    Persistent(Arc<dyn Storage>),
    /// Owned store holding live values
    Memory(Arc<MemoryStore>),
}

/// Which backend a [`Manager`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Persistent,
    Memory,
}

// == Manager ==
/// Cache accessor shared by all request handlers of one middleware instance.
///
/// Holds no lock of its own; the pool and both backends are internally
/// synchronized. No operation returns an error: failures degrade to a miss
/// or a skipped write.
///
/// Containers returned by [`get`](Self::get) on the memory backend are the
/// cached values themselves. Mutate them only through `Arc::make_mut`, which
/// copies instead of touching what concurrent readers see.
pub struct Manager {
    backend: Backend,
    pool: ContainerPool,
    codec: Codec,
    cleanup_interval: u64,
}

impl Manager {
    // == Constructor ==
    /// Creates a manager over `storage`, or over a fresh memory store if `None`.
    pub fn new(storage: Option<Arc<dyn Storage>>) -> Self {
        Self::with_config(storage, &Config::default())
    }

    pub fn with_config(storage: Option<Arc<dyn Storage>>, config: &Config) -> Self {
        let backend = match storage {
            Some(storage) => Backend::Persistent(storage),
            None => Backend::Memory(Arc::new(MemoryStore::new())),
        };
        // Containers only come back to the pool in memory mode
        let pooling_active = matches!(backend, Backend::Memory(_));

        Self {
            backend,
            pool: ContainerPool::new(pooling_active),
            codec: Codec::new(config.max_encoded_size),
            // A zero interval would make the sweeper spin
            cleanup_interval: config.cleanup_interval.max(1),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self.backend {
            Backend::Persistent(_) => BackendKind::Persistent,
            Backend::Memory(_) => BackendKind::Memory,
        }
    }

    pub fn pooling_active(&self) -> bool {
        self.pool.is_active()
    }

    // == Acquire / Release ==
    /// Takes an empty container from the pool.
    pub fn acquire(&self) -> Arc<EntryContainer> {
        self.pool.acquire()
    }

    /// Hands a container back to the pool.
    ///
    /// Safe to call with any handle: a container the memory store still
    /// references is dropped rather than recycled.
    pub fn release(&self, container: Arc<EntryContainer>) {
        self.pool.release(container)
    }

    // == Get ==
    /// Returns the container stored under `key`, or an empty one on a miss.
    pub fn get(&self, key: &str) -> Arc<EntryContainer> {
        match &self.backend {
            Backend::Persistent(storage) => {
                let mut container = self.pool.acquire();
                let raw = storage.get(key).map_err(CacheError::from);
                let raw = degrade_on_error("get", key, raw, || None);
                if let (Some(raw), Some(target)) = (raw, Arc::get_mut(&mut container)) {
                    let decoded = self.codec.decode_into(&raw, target);
                    degrade_on_error("get", key, decoded, || ());
                }
                container
            }
            Backend::Memory(memory) => {
                let found = match memory.get(key) {
                    Some(StoredValue::Segments(container)) => Ok(Some(container)),
                    Some(other) => Err(CacheError::TypeMismatch {
                        key: key.to_string(),
                        expected: StoredValue::SEGMENTS,
                        found: other.kind(),
                    }),
                    None => Ok(None),
                };
                // A miss hands out a fresh container the caller may fill and set
                degrade_on_error("get", key, found, || None)
                    .unwrap_or_else(|| self.pool.acquire())
            }
        }
    }

    // == Get Raw ==
    /// Returns the bytes stored under `key` without decoding them.
    pub fn get_raw(&self, key: &str) -> Option<Bytes> {
        match &self.backend {
            Backend::Persistent(storage) => {
                let raw = storage.get(key).map_err(CacheError::from);
                degrade_on_error("get_raw", key, raw, || None).map(Bytes::from)
            }
            Backend::Memory(memory) => {
                let raw = match memory.get(key)? {
                    StoredValue::Raw(raw) => Ok(Some(raw)),
                    other => Err(CacheError::TypeMismatch {
                        key: key.to_string(),
                        expected: StoredValue::RAW,
                        found: other.kind(),
                    }),
                };
                degrade_on_error("get_raw", key, raw, || None)
            }
        }
    }

    // == Set ==
    /// Stores `container` under `key` for `ttl`. A zero `ttl` never expires.
    ///
    /// On the persistent backend the container is encoded and then released
    /// to the pool. On the memory backend the store takes ownership of it.
    pub fn set(&self, key: &str, container: Arc<EntryContainer>, ttl: Duration) {
        match &self.backend {
            Backend::Persistent(storage) => {
                let stored = self.codec.encode(&container).and_then(|raw| {
                    storage.set(key, &raw, ttl).map_err(CacheError::from)
                });
                degrade_on_error("set", key, stored, || ());
                self.pool.release(container);
            }
            Backend::Memory(memory) => {
                memory.set(key, StoredValue::Segments(container), ttl);
            }
        }
    }

    // == Set Raw ==
    /// Stores pre-serialized bytes under `key` for `ttl`.
    pub fn set_raw(&self, key: &str, raw: Bytes, ttl: Duration) {
        match &self.backend {
            Backend::Persistent(storage) => {
                let stored = storage.set(key, &raw, ttl).map_err(CacheError::from);
                degrade_on_error("set_raw", key, stored, || ());
            }
            Backend::Memory(memory) => {
                memory.set(key, StoredValue::Raw(raw), ttl);
            }
        }
    }

    // == Delete ==
    /// Removes `key` from the active backend, best effort.
    pub fn del(&self, key: &str) {
        match &self.backend {
            Backend::Persistent(storage) => {
                let deleted = storage.delete(key).map_err(CacheError::from);
                degrade_on_error("del", key, deleted, || ());
            }
            Backend::Memory(memory) => {
                memory.delete(key);
            }
        }
    }

    // == Background Sweep ==
    /// Starts the expiry sweeper for the memory backend.
    ///
    /// Must be called from within a tokio runtime. Returns `None` on the
    /// persistent backend, which expires keys on its own. The task ends by
    /// itself after the manager is dropped.
    pub fn spawn_cleanup_task(&self) -> Option<JoinHandle<()>> {
        match &self.backend {
            Backend::Persistent(_) => None,
            Backend::Memory(memory) => {
                info!(interval = self.cleanup_interval, "starting memory store sweeper");
                Some(spawn_cleanup_task(Arc::clone(memory), self.cleanup_interval))
            }
        }
    }

    // == Stats ==
    /// Memory store counters, or `None` on the persistent backend.
    pub fn memory_stats(&self) -> Option<StoreStats> {
        match &self.backend {
            Backend::Persistent(_) => None,
            Backend::Memory(memory) => Some(memory.stats()),
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("backend", &self.backend_kind())
            .field("pool", &self.pool)
            .field("codec", &self.codec)
            .finish()
    }
}
