//! Two-tier snapshot cache: the in-process edge cache in front of the
//! durable store, with a rebuild behind both.
//!
//! Every read resolves to one of four [`ReadState`]s. The three non-forced
//! branches answer immediately and, except for an edge hit, leave a detached
//! rebuild running that repopulates both tiers. Concurrent misses may each
//! start a rebuild; the last write wins on both tiers.

use std::sync::Arc;

use chrono::Utc;
use pickupboard_core::{Snapshot, SnapshotSource};
use pickupboard_db::DbError;
use pickupboard_scraper::{ScraperError, SnapshotBuilder};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::edge::{CachedResponse, ResponseCache};
use super::freshness::Freshness;
use super::store::SnapshotStore;

/// Query parameters that only steer caching and never reach the cache key.
const CACHE_CONTROL_PARAMS: &[&str] = &["force", "_"];
const FORCE_VALUES: &[&str] = &["1", "true", "yes"];

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("snapshot rebuild failed: {0}")]
    Build(#[from] ScraperError),
    #[error("durable snapshot store failed: {0}")]
    Store(#[from] DbError),
    #[error("snapshot could not be serialized: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    EdgeHit,
    DurableHit,
    ColdStart,
    ForcedRefresh,
}

impl ReadState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReadState::EdgeHit => "edge-hit",
            ReadState::DurableHit => "durable-hit",
            ReadState::ColdStart => "cold-start",
            ReadState::ForcedRefresh => "forced-refresh",
        }
    }
}

/// Outcome of one read.
#[derive(Debug)]
pub struct Served {
    pub state: ReadState,
    pub response: CachedResponse,
    /// Background rebuild started by this read. HTTP handlers drop it; the
    /// task keeps running.
    pub refresh: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SnapshotCoordinator {
    builder: Arc<dyn SnapshotBuilder>,
    store: Arc<dyn SnapshotStore>,
    edge: ResponseCache,
    ttl_secs: u64,
}

impl SnapshotCoordinator {
    #[must_use]
    pub fn new(
        builder: Arc<dyn SnapshotBuilder>,
        store: Arc<dyn SnapshotStore>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            builder,
            store,
            edge: ResponseCache::default(),
            ttl_secs,
        }
    }

    /// Serves the availability snapshot for the request at `path` with the
    /// decoded query `params`.
    ///
    /// # Errors
    ///
    /// Only a forced read fails, with the error of its synchronous rebuild.
    pub async fn read(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Served, CoordinatorError> {
        let key = cache_key(path, params);

        if is_forced(params) {
            let snapshot = self.refresh_and_persist().await.inspect_err(|e| {
                tracing::error!(key = %key, error = %e, "forced snapshot rebuild failed");
            })?;
            let response = render(snapshot)?;
            self.store_edge(&key, &response).await;
            return Ok(Served {
                state: ReadState::ForcedRefresh,
                response,
                refresh: None,
            });
        }

        if let Some(response) = self.edge.get(&key).await {
            return Ok(Served {
                state: ReadState::EdgeHit,
                response,
                refresh: None,
            });
        }

        let durable = match self.store.get_latest().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "durable snapshot read failed; treating as cold start");
                None
            }
        };

        match durable {
            Some(snapshot) => {
                let response = render(snapshot.with_source(SnapshotSource::Kv))?;
                self.store_edge(&key, &response).await;
                Ok(Served {
                    state: ReadState::DurableHit,
                    response,
                    refresh: Some(self.spawn_refresh(key)),
                })
            }
            None => {
                let response = render(Snapshot::placeholder(Utc::now()))?;
                Ok(Served {
                    state: ReadState::ColdStart,
                    response,
                    refresh: Some(self.spawn_refresh(key)),
                })
            }
        }
    }

    /// Rebuilds the snapshot, tags it `fresh` and writes it to the durable
    /// store. Used by forced reads, background refreshes and the periodic
    /// trigger.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Build`] when the rebuild fails and
    /// [`CoordinatorError::Store`] when the durable write fails.
    pub async fn refresh_and_persist(&self) -> Result<Snapshot, CoordinatorError> {
        let snapshot = self
            .builder
            .build()
            .await?
            .with_source(SnapshotSource::Fresh);
        self.store.put_latest(&snapshot, self.ttl_secs).await?;
        Ok(snapshot)
    }

    fn spawn_refresh(&self, key: String) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match coordinator.refresh_and_persist().await.and_then(render) {
                Ok(response) => {
                    coordinator.store_edge(&key, &response).await;
                    tracing::debug!(key = %key, "background snapshot refresh stored");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "background snapshot refresh failed");
                }
            }
        })
    }

    async fn store_edge(&self, key: &str, response: &CachedResponse) {
        let ttl = response.freshness.edge_ttl();
        self.edge.put(key, response.clone(), ttl).await;
    }

    #[cfg(test)]
    pub(crate) fn edge(&self) -> &ResponseCache {
        &self.edge
    }
}

/// Serializes a tagged snapshot with the `Cache-Control` its tag and content
/// call for.
fn render(snapshot: Snapshot) -> Result<CachedResponse, CoordinatorError> {
    let source = snapshot.source.unwrap_or(SnapshotSource::Fresh);
    Ok(CachedResponse {
        freshness: Freshness::for_snapshot(source, snapshot.has_availability()),
        body: serde_json::to_string(&snapshot)?,
        source,
    })
}

/// Canonical cache key: the path plus the query with cache-steering
/// parameters removed and the rest sorted.
#[must_use]
pub fn cache_key(path: &str, params: &[(String, String)]) -> String {
    let mut kept: Vec<&(String, String)> = params
        .iter()
        .filter(|(name, _)| !CACHE_CONTROL_PARAMS.contains(&name.as_str()))
        .collect();
    kept.sort();

    if kept.is_empty() {
        return path.to_string();
    }
    let query = kept
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

#[must_use]
pub fn is_forced(params: &[(String, String)]) -> bool {
    params.iter().any(|(name, value)| {
        name == "force"
            && FORCE_VALUES
                .iter()
                .any(|v| value.trim().eq_ignore_ascii_case(v))
    })
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
