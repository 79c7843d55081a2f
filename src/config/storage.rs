//! Storage configuration types.

use serde::Deserialize;

/// Storage configuration.
///
/// The backing store is a single SQLite database file; the pool is opened
/// in WAL mode with a busy timeout so concurrent writers queue instead of
/// failing immediately.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Busy timeout applied to every connection, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Bounded retry attempts for write transactions that lose a lock race.
    pub write_retries: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "questline.db".to_string(),
            busy_timeout_ms: 5000,
            write_retries: 5,
        }
    }
}
