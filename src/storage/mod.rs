//! Storage implementations.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::config::{GameRules, StorageConfig};
use crate::interfaces::GameStore;

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteGameStore;

/// Initialize storage based on configuration.
///
/// Opens (or creates) the SQLite database in WAL mode with a busy timeout,
/// creates the schema, and returns the store behind its interface.
pub async fn init_storage(
    config: &StorageConfig,
    rules: Arc<GameRules>,
) -> Result<Arc<dyn GameStore>, Box<dyn std::error::Error>> {
    info!(path = %config.path, "Storage: sqlite");

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    let store = SqliteGameStore::new(pool, rules, config.write_retries);
    store.init().await?;

    Ok(Arc::new(store))
}
