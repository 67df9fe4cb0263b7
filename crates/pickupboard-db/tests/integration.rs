//! Offline tests for pickupboard-db pool configuration.
//! These tests do not require a live database connection.

use pickupboard_core::{load_app_config_from_env, AppConfig};
use pickupboard_db::PoolConfig;

fn app_config() -> AppConfig {
    let mut config = load_app_config_from_env().unwrap_or_else(|e| panic!("config: {e}"));
    config.db_max_connections = 42;
    config.db_min_connections = 7;
    config.db_acquire_timeout_secs = 9;
    config
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());

    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_default_is_small() {
    let config = PoolConfig::default();

    assert_eq!(config.max_connections, 5);
    assert_eq!(config.min_connections, 1);
    assert_eq!(config.acquire_timeout_secs, 10);
}

#[test]
fn migration_directory_contains_snapshot_table() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let found = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("read {}: {e}", dir.display()))
        .filter_map(Result::ok)
        .any(|entry| {
            std::fs::read_to_string(entry.path())
                .map(|sql| sql.contains("CREATE TABLE IF NOT EXISTS snapshot_kv"))
                .unwrap_or(false)
        });
    assert!(found, "no migration creates snapshot_kv");
}
