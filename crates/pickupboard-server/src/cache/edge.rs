//! In-process response cache standing in for the CDN edge.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pickupboard_core::SnapshotSource;
use tokio::sync::RwLock;

use super::freshness::Freshness;

/// A fully rendered availability response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Serialized snapshot JSON.
    pub body: String,
    pub freshness: Freshness,
    pub source: SnapshotSource,
}

impl CachedResponse {
    #[must_use]
    pub fn cache_control(&self) -> String {
        self.freshness.header_value()
    }
}

#[derive(Debug)]
struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// Responses keyed by canonical request key, each expiring after its own TTL.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl ResponseCache {
    /// Returns the live entry under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.response.clone())
    }

    /// Stores `response` under `key` for `ttl`, replacing any previous entry
    /// and dropping other entries that have already expired.
    pub async fn put(&self, key: &str, response: CachedResponse, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                response,
                expires_at: now + ttl,
            },
        );
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
