pub mod builder;
pub mod client;
pub mod discover;
pub mod embed;
pub mod error;
pub mod fulfillment;
pub mod hours;
pub mod normalize;
pub mod types;

pub use builder::{SnapshotBuilder, UpstreamSnapshotBuilder};
pub use client::UpstreamClient;
pub use discover::{discover_parts, merge_parts, parse_listing};
pub use embed::extract_script_payload;
pub use error::ScraperError;
pub use fulfillment::{fetch_all_seeds, fetch_seed_stores};
pub use hours::{evaluate_hours, parse_hours, HoursRule, HoursStatus};
pub use normalize::{assemble_snapshot, merge_stores, normalize_store};
pub use types::{FulfillmentResponse, RawPartAvailability, RawStore};
