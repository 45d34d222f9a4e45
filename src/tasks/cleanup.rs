//! TTL Cleanup Task
//!
//! Background task that periodically removes expired memory store values.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::storage::MemoryStore;

/// Spawns a background task that periodically sweeps expired values.
///
/// The task sleeps for the specified interval between sweeps and runs until
/// aborted or until the last other handle to `store` is dropped. Readers never
/// observe expired values even without it; the sweep only reclaims memory for
/// keys nobody reads again.
///
/// # Arguments
/// * `store` - Shared memory store to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps, at least 1
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let cleanup_interval_secs = cleanup_interval_secs.max(1);
    let interval = Duration::from_secs(cleanup_interval_secs);
    let store: Weak<MemoryStore> = Arc::downgrade(&store);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("TTL cleanup: store dropped, stopping");
                break;
            };
            let removed = store.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
