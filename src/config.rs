//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

/// Default cap on the size of an encoded entry container (64 MiB).
pub const DEFAULT_MAX_ENCODED_SIZE: u64 = 64 * 1024 * 1024;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Memory store expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Largest encoded container the codec will produce or accept, in bytes
    pub max_encoded_size: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `CACHE_MAX_ENCODED_SIZE` - Codec size limit in bytes (default: 64 MiB)
    pub fn from_env() -> Self {
        Self {
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(1),
            max_encoded_size: env::var("CACHE_MAX_ENCODED_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENCODED_SIZE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleanup_interval: 1,
            max_encoded_size: DEFAULT_MAX_ENCODED_SIZE,
        }
    }
}
