//! Full snapshot rebuild: discover parts, query every seed, normalize.

use async_trait::async_trait;
use chrono::Utc;
use pickupboard_core::{Snapshot, UpstreamConfig};

use crate::client::UpstreamClient;
use crate::discover::discover_parts;
use crate::error::ScraperError;
use crate::fulfillment::fetch_all_seeds;
use crate::normalize::assemble_snapshot;

/// Produces a complete, untagged [`Snapshot`] on demand.
///
/// The cache layer only depends on this trait, so tests can substitute a
/// canned builder for the live storefront.
#[async_trait]
pub trait SnapshotBuilder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the rebuild cannot produce a snapshot at
    /// all (no parts discovered, client construction failure).
    async fn build(&self) -> Result<Snapshot, ScraperError>;
}

/// Builds snapshots from the live storefront.
#[derive(Debug, Clone)]
pub struct UpstreamSnapshotBuilder {
    client: UpstreamClient,
    config: UpstreamConfig,
}

impl UpstreamSnapshotBuilder {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: UpstreamConfig) -> Result<Self, ScraperError> {
        let client = UpstreamClient::new(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SnapshotBuilder for UpstreamSnapshotBuilder {
    async fn build(&self) -> Result<Snapshot, ScraperError> {
        tracing::info!(
            families = self.config.families.len(),
            seeds = self.config.location_seeds.len(),
            "snapshot rebuild starting"
        );

        let parts = discover_parts(
            &self.client,
            &self.config.families,
            &self.config.payload_anchor,
        )
        .await?;
        let batches = fetch_all_seeds(&self.client, &parts, &self.config.location_seeds).await;

        let generated_at = Utc::now();
        let local_now = generated_at
            .with_timezone(&self.config.store_utc_offset)
            .naive_local();
        let snapshot = assemble_snapshot(parts, batches, local_now, generated_at);

        tracing::info!(
            models = snapshot.models.len(),
            stores = snapshot.stores.len(),
            records = snapshot.availability.len(),
            available = snapshot.available_count(),
            "snapshot rebuild finished"
        );
        Ok(snapshot)
    }
}
