//! Response and durable snapshot caching.

pub mod coordinator;
pub mod edge;
pub mod freshness;
pub mod store;

pub use coordinator::{CoordinatorError, ReadState, Served, SnapshotCoordinator};
pub use edge::{CachedResponse, ResponseCache};
pub use freshness::{Freshness, DASHBOARD_CACHE_CONTROL};
pub use store::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
