//! Durable snapshot storage in the `snapshot_kv` table.

use chrono::{DateTime, Duration, Utc};
use pickupboard_core::Snapshot;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// Key under which the latest rebuilt snapshot is stored.
pub const LATEST_SNAPSHOT_KEY: &str = "availability:latest";

/// Reads the unexpired snapshot stored under `key`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Corrupt`] if
/// the stored document no longer decodes as a [`Snapshot`].
pub async fn get_snapshot(pool: &PgPool, key: &str) -> Result<Option<Snapshot>, DbError> {
    let value = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT value FROM snapshot_kv WHERE key = $1 AND expires_at > NOW()",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    value
        .map(|v| {
            serde_json::from_value::<Snapshot>(v).map_err(|source| DbError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Stores `snapshot` under `key`, replacing any previous value and resetting
/// its expiry to `ttl_secs` from now. Returns the new expiry.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn put_snapshot(
    pool: &PgPool,
    key: &str,
    snapshot: &Snapshot,
    ttl_secs: u64,
) -> Result<DateTime<Utc>, DbError> {
    let expires_at = i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    sqlx::query(
        "INSERT INTO snapshot_kv (key, value, expires_at, updated_at) \
         VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (key) DO UPDATE \
         SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at, updated_at = NOW()",
    )
    .bind(key)
    .bind(Json(snapshot))
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(expires_at)
}

/// Deletes every expired row and returns how many were removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_snapshots(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM snapshot_kv WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
