use chrono::FixedOffset;

use crate::app_config::{AppConfig, Environment, UpstreamConfig};
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.apple.com";
pub const DEFAULT_REGION_PATH: &str = "/tw";
pub const DEFAULT_LOCATION_SEEDS: &[&str] = &["台北市 信義區", "台中市 西屯區", "高雄市 前鎮區"];
pub const DEFAULT_FAMILIES: &[&str] = &["iphone-17-pro", "iphone-air", "iphone-17", "iphone-16e"];
pub const DEFAULT_PAYLOAD_ANCHOR: &str = "metrics";
/// Asia/Taipei has no daylight saving, so a fixed offset is exact.
pub const DEFAULT_STORE_UTC_OFFSET_MINUTES: i32 = 8 * 60;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a supplied value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a supplied value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup is injected so tests can drive it
/// from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let list_or_default = |var: &str, default: &[&str]| -> Vec<String> {
        let parsed = lookup(var).map(|raw| split_list(&raw)).unwrap_or_default();
        if parsed.is_empty() {
            default.iter().map(|s| (*s).to_string()).collect()
        } else {
            parsed
        }
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
    let env = parse_environment(&or_default("PICKUPBOARD_ENV", "development"))?;

    let bind_addr = or_default("PICKUPBOARD_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PICKUPBOARD_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PICKUPBOARD_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PICKUPBOARD_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("PICKUPBOARD_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PICKUPBOARD_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let base_url = or_default("PICKUPBOARD_BASE_URL", DEFAULT_BASE_URL)
        .trim()
        .trim_end_matches('/')
        .to_string();
    let region_path = normalize_region_path(&or_default(
        "PICKUPBOARD_REGION_PATH",
        DEFAULT_REGION_PATH,
    ));

    let offset_minutes = or_default(
        "PICKUPBOARD_STORE_UTC_OFFSET_MINUTES",
        &DEFAULT_STORE_UTC_OFFSET_MINUTES.to_string(),
    )
    .parse::<i32>()
    .map_err(|e| invalid("PICKUPBOARD_STORE_UTC_OFFSET_MINUTES", e.to_string()))?;
    let store_utc_offset = offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            invalid(
                "PICKUPBOARD_STORE_UTC_OFFSET_MINUTES",
                format!("{offset_minutes} is outside -1439..=1439"),
            )
        })?;

    let upstream = UpstreamConfig {
        base_url,
        region_path,
        location_seeds: list_or_default("PICKUPBOARD_LOCATION_SEEDS", DEFAULT_LOCATION_SEEDS),
        families: list_or_default("PICKUPBOARD_FAMILIES", DEFAULT_FAMILIES),
        payload_anchor: or_default("PICKUPBOARD_PAYLOAD_ANCHOR", DEFAULT_PAYLOAD_ANCHOR),
        store_utc_offset,
        request_timeout_secs: parse_u64("PICKUPBOARD_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("PICKUPBOARD_USER_AGENT", DEFAULT_USER_AGENT),
    };

    let snapshot_ttl_secs = parse_u64("PICKUPBOARD_SNAPSHOT_TTL_SECS", "21600")?;
    let refresh_cron = or_default("PICKUPBOARD_REFRESH_CRON", "0 */5 * * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        upstream,
        snapshot_ttl_secs,
        refresh_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PICKUPBOARD_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// `tw`, `/tw/` and `/tw` all become `/tw`; blank becomes the empty string
/// so the storefront root is used.
fn normalize_region_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
