//! Durable snapshot tier.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pickupboard_core::Snapshot;
use pickupboard_db::{DbError, LATEST_SNAPSHOT_KEY};
use sqlx::PgPool;
use tokio::sync::RwLock;

/// Holds the latest snapshot with an expiry.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`DbError`] when the backing store cannot be read.
    async fn get_latest(&self) -> Result<Option<Snapshot>, DbError>;

    /// # Errors
    ///
    /// Returns [`DbError`] when the backing store cannot be written.
    async fn put_latest(&self, snapshot: &Snapshot, ttl_secs: u64) -> Result<(), DbError>;
}

/// `snapshot_kv` table in Postgres.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn get_latest(&self) -> Result<Option<Snapshot>, DbError> {
        pickupboard_db::get_snapshot(&self.pool, LATEST_SNAPSHOT_KEY).await
    }

    async fn put_latest(&self, snapshot: &Snapshot, ttl_secs: u64) -> Result<(), DbError> {
        let expires_at =
            pickupboard_db::put_snapshot(&self.pool, LATEST_SNAPSHOT_KEY, snapshot, ttl_secs)
                .await?;
        tracing::debug!(%expires_at, "durable snapshot stored");
        Ok(())
    }
}

/// Process-local store used when no database is configured. Contents are
/// lost on restart.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    latest: RwLock<Option<(Snapshot, Instant)>>,
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get_latest(&self) -> Result<Option<Snapshot>, DbError> {
        let latest = self.latest.read().await;
        Ok(latest
            .as_ref()
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(snapshot, _)| snapshot.clone()))
    }

    async fn put_latest(&self, snapshot: &Snapshot, ttl_secs: u64) -> Result<(), DbError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .unwrap_or(now + Duration::from_secs(u64::from(u32::MAX)));
        *self.latest.write().await = Some((snapshot.clone(), expires_at));
        Ok(())
    }
}
