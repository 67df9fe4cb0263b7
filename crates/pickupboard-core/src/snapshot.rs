//! Snapshot payload served by the availability API and held in the durable store.
//!
//! Field names are camelCase on the wire because the dashboard script reads
//! them directly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pickup status the upstream reports when a part can be collected in store.
pub const STATUS_AVAILABLE: &str = "available";

/// Which cache tier produced a served snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Read back from the durable store while a rebuild runs in the background.
    Kv,
    /// Produced by a rebuild that completed for this response or the edge entry.
    Fresh,
    /// Empty placeholder returned on a cold start.
    Warmup,
}

impl SnapshotSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotSource::Kv => "kv",
            SnapshotSource::Fresh => "fresh",
            SnapshotSource::Warmup => "warmup",
        }
    }
}

impl std::fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable device configuration, identified by its part number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub name: String,
    pub part_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Slug of the listing page the part was first discovered on.
    pub family: String,
    /// Full retail price in the region's currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

/// A retail store with display fields derived at normalization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Upstream store number, or `country|city|name` when the upstream omits it.
    pub store_number: String,
    pub name: String,
    pub city: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub is_open: bool,
    /// Today's opening hours as the upstream phrases them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_hours: Option<String>,
    pub map_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel_url: Option<String>,
}

/// Compact store projection listed at the top level of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub store_number: String,
    pub name: String,
    pub city: String,
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_hours: Option<String>,
}

impl From<&Store> for StoreSummary {
    fn from(store: &Store) -> Self {
        Self {
            store_number: store.store_number.clone(),
            name: store.name.clone(),
            city: store.city.clone(),
            is_open: store.is_open,
            today_hours: store.today_hours.clone(),
        }
    }
}

/// Pickup availability of one part at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub store: Store,
    pub part: Part,
    /// Upstream pickup status, e.g. `"available"` or `"unavailable"`.
    pub status: String,
    pub is_buyable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_type: Option<String>,
    /// Human-readable pickup quote, e.g. `"Available today"`.
    pub pickup_quote: String,
}

impl AvailabilityRecord {
    /// `true` when the part can be bought and collected at this store.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_buyable && self.status.eq_ignore_ascii_case(STATUS_AVAILABLE)
    }
}

/// The complete current-state payload produced by one rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SnapshotSource>,
    pub generated_at: DateTime<Utc>,
    pub models: Vec<Part>,
    pub stores: Vec<StoreSummary>,
    pub availability: Vec<AvailabilityRecord>,
}

impl Snapshot {
    /// Empty snapshot returned while the first rebuild is still running.
    #[must_use]
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            source: Some(SnapshotSource::Warmup),
            generated_at: now,
            models: Vec::new(),
            stores: Vec::new(),
            availability: Vec::new(),
        }
    }

    /// Returns a copy tagged with `source`.
    #[must_use]
    pub fn with_source(mut self, source: SnapshotSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns `true` if any store can currently hand over any part.
    #[must_use]
    pub fn has_availability(&self) -> bool {
        self.availability
            .iter()
            .any(AvailabilityRecord::is_available)
    }

    #[must_use]
    pub fn available_count(&self) -> usize {
        self.availability
            .iter()
            .filter(|r| r.is_available())
            .count()
    }
}
