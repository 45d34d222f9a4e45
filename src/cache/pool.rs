//! Container Pool Module
//!
//! Concurrent free list of reusable entry containers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_queue::SegQueue;
use serde::Serialize;
use tracing::trace;

use crate::cache::EntryContainer;

// == Pool Stats ==
/// Snapshot of pool activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Containers created because the free list was empty
    pub allocated: u64,
    /// Containers handed out from the free list
    pub reused: u64,
    /// Containers cleared and pushed back onto the free list
    pub released: u64,
    /// Release calls that dropped the container instead
    pub discarded: u64,
}

// == Container Pool ==
/// Unbounded pool of [`EntryContainer`]s handed out as `Arc`s.
///
/// A container is recycled only when the caller holds the last handle to it.
/// Anything still shared, such as a container the memory store keeps as a
/// cached value, is dropped by [`release`](Self::release) instead of reused.
#[derive(Debug)]
pub struct ContainerPool {
    free: SegQueue<Arc<EntryContainer>>,
    /// Fixed at construction from the selected backend
    active: bool,
    allocated: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl ContainerPool {
    // == Constructor ==
    /// Creates an empty pool. An inactive pool never keeps released containers.
    pub fn new(active: bool) -> Self {
        Self {
            free: SegQueue::new(),
            active,
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            released: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Returns true if released containers are kept for reuse.
    pub fn is_active(&self) -> bool {
        self.active
    }

    // == Acquire ==
    /// Returns an empty container owned solely by the caller.
    pub fn acquire(&self) -> Arc<EntryContainer> {
        match self.free.pop() {
            Some(container) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                container
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Arc::new(EntryContainer::new())
            }
        }
    }

    // == Release ==
    /// Clears `container` and puts it back on the free list.
    ///
    /// No-op (the handle is simply dropped) when the pool is inactive or when
    /// another handle to the same container is still alive.
    pub fn release(&self, mut container: Arc<EntryContainer>) {
        if !self.active {
            return;
        }
        if let Some(inner) = Arc::get_mut(&mut container) {
            inner.clear();
        } else {
            trace!(
                refs = Arc::strong_count(&container),
                "container still shared, not recycled"
            );
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.released.fetch_add(1, Ordering::Relaxed);
        self.free.push(container);
    }

    /// Number of idle containers on the free list.
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    // == Stats ==
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
