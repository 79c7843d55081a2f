//! Shared test fixtures: a real sqlite store on a temp file.

use std::sync::Arc;

use tempfile::TempDir;

use questline::config::{GameRules, StorageConfig};
use questline::domain::NewSalesperson;
use questline::interfaces::GameStore;
use questline::storage::init_storage;

/// Open a fresh store backed by a temp-file database. The TempDir must be
/// kept alive for the duration of the test.
pub async fn temp_store() -> (TempDir, Arc<dyn GameStore>, Arc<GameRules>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("questline-test.db");
    let config = StorageConfig {
        path: path.to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    let rules = Arc::new(GameRules::default());
    let store = init_storage(&config, Arc::clone(&rules))
        .await
        .expect("init storage");
    (dir, store, rules)
}

/// Insert a salesperson with a unique phone derived from the suffix.
pub async fn add_salesperson(store: &dyn GameStore, name: &str, suffix: u32) -> i64 {
    store
        .insert_salesperson(&NewSalesperson::new(name, format!("55119999{suffix:04}")))
        .await
        .expect("insert salesperson")
        .id
}
