//! Per-seed pickup availability queries.

use pickupboard_core::Part;

use crate::client::UpstreamClient;
use crate::types::RawStore;

/// Queries the fulfillment endpoint for one seed.
///
/// Any failure (status, transport, body) is logged and yields an empty
/// list so one bad seed never sinks a rebuild.
pub async fn fetch_seed_stores(client: &UpstreamClient, parts: &[Part], seed: &str) -> Vec<RawStore> {
    match client.fetch_fulfillment(parts, seed).await {
        Ok(response) => {
            let stores = response.into_stores();
            tracing::debug!(seed, stores = stores.len(), "fulfillment seed fetched");
            stores
        }
        Err(e) => {
            tracing::warn!(seed, error = %e, "dropping fulfillment seed");
            Vec::new()
        }
    }
}

/// Queries each seed in order, one at a time.
pub async fn fetch_all_seeds(
    client: &UpstreamClient,
    parts: &[Part],
    seeds: &[String],
) -> Vec<Vec<RawStore>> {
    let mut batches = Vec::with_capacity(seeds.len());
    for seed in seeds {
        batches.push(fetch_seed_stores(client, parts, seed).await);
    }
    batches
}
