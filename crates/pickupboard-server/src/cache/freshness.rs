//! `Cache-Control` lifetimes for availability responses.
//!
//! Availability is volatile and unavailability comparatively stable, so
//! snapshots with something to buy are cached for less time. Stand-in
//! responses (`kv`, `warmup`) get a short window because a rebuild is
//! already on its way.

use std::time::Duration;

use pickupboard_core::SnapshotSource;

/// Served with the dashboard page; independent of data freshness.
pub const DASHBOARD_CACHE_CONTROL: &str = "public, max-age=300, s-maxage=86400";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// Browser lifetime in seconds.
    pub max_age: u32,
    /// Edge lifetime in seconds; also the in-process edge entry's TTL.
    pub s_maxage: u32,
    pub stale_while_revalidate: u32,
}

impl Freshness {
    #[must_use]
    pub fn for_snapshot(source: SnapshotSource, has_availability: bool) -> Self {
        let (max_age, s_maxage, stale_while_revalidate) = match (source, has_availability) {
            (SnapshotSource::Fresh, true) => (30, 60, 120),
            (SnapshotSource::Fresh, false) => (120, 300, 600),
            (SnapshotSource::Kv | SnapshotSource::Warmup, true) => (5, 15, 60),
            (SnapshotSource::Kv | SnapshotSource::Warmup, false) => (10, 30, 120),
        };
        Self {
            max_age,
            s_maxage,
            stale_while_revalidate,
        }
    }

    #[must_use]
    pub fn header_value(self) -> String {
        format!(
            "public, max-age={}, s-maxage={}, stale-while-revalidate={}",
            self.max_age, self.s_maxage, self.stale_while_revalidate
        )
    }

    #[must_use]
    pub fn edge_ttl(self) -> Duration {
        Duration::from_secs(u64::from(self.s_maxage))
    }
}
