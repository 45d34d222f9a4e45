//! Cache Module
//!
//! Entry model, codec, container pool and the backend-dispatching manager.

mod codec;
mod entry;
mod manager;
mod pool;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::Codec;
pub use entry::{current_timestamp_ms, Entry, EntryContainer};
pub use manager::{BackendKind, Manager};
pub use pool::{ContainerPool, PoolStats};
