pub mod app_config;
pub mod config;
pub mod snapshot;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, UpstreamConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use snapshot::{AvailabilityRecord, Part, Snapshot, SnapshotSource, Store, StoreSummary};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
