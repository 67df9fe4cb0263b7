use std::net::SocketAddr;

use chrono::FixedOffset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where and how to reach the retailer's public storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Origin of the storefront, without a trailing slash.
    pub base_url: String,
    /// Region prefix such as `/tw`; always starts with `/`, never ends with one.
    pub region_path: String,
    /// Location strings submitted to the fulfillment query, in fetch order.
    pub location_seeds: Vec<String>,
    /// Product family slugs whose listing pages are scraped for part numbers.
    pub families: Vec<String>,
    /// `id` attribute of the script block carrying the listing payload.
    pub payload_anchor: String,
    /// Local time of the retail region, used to evaluate store hours.
    pub store_utc_offset: FixedOffset,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub upstream: UpstreamConfig,
    /// Safety expiration of the durable snapshot.
    pub snapshot_ttl_secs: u64,
    /// Six-field cron expression for the periodic refresh.
    pub refresh_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("upstream", &self.upstream)
            .field("snapshot_ttl_secs", &self.snapshot_ttl_secs)
            .field("refresh_cron", &self.refresh_cron)
            .finish()
    }
}
