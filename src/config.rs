//! Environment-variable configuration for embedding applications.
//!
//! Every knob falls back to a default when unset or unparseable, so a bare
//! `Config::from_env()` always succeeds.

use std::time::Duration;

const DEFAULT_ADDRESS: &str = ":502";
const DEFAULT_SQLITE_DSN: &str = "modbus.db";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which store backend the embedding should construct
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreType {
    /// The in-memory store shipped with this crate
    InMemory,
    /// A SQL-backed store supplied by the embedding
    Sqlite,
}

/// Configuration assembled from the process environment
#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` to listen on (`SERVER_ADDRESS`, default `:502`)
    pub address: String,
    /// Store backend selector (`STORE_TYPE`, default `inmemory`)
    pub store_type: StoreType,
    /// Connection string for a SQL-backed store (`SQLITE_DSN`)
    pub sqlite_dsn: String,
    /// Socket timeout for the embedding to apply (`TIMEOUT`, default 5s).
    /// The server core itself does not impose per-operation timeouts.
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            address: normalize_address(&env_or("SERVER_ADDRESS", DEFAULT_ADDRESS)),
            store_type: parse_store_type(&env_or("STORE_TYPE", "inmemory")),
            sqlite_dsn: env_or("SQLITE_DSN", DEFAULT_SQLITE_DSN),
            timeout: std::env::var("TIMEOUT")
                .ok()
                .and_then(|value| parse_duration(&value))
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: normalize_address(DEFAULT_ADDRESS),
            store_type: StoreType::InMemory,
            sqlite_dsn: DEFAULT_SQLITE_DSN.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

// a bare ":502" means every interface
fn normalize_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

fn parse_store_type(value: &str) -> StoreType {
    match value.to_ascii_lowercase().as_str() {
        "sqlite" => StoreType::Sqlite,
        "inmemory" => StoreType::InMemory,
        other => {
            tracing::warn!("unknown STORE_TYPE {:?}, falling back to inmemory", other);
            StoreType::InMemory
        }
    }
}

// accepts "250ms", "5s" or a bare number of seconds
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Some(millis) = value.strip_suffix("ms") {
        return millis.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.trim().parse().ok().map(Duration::from_secs);
    }
    value.parse().ok().map(Duration::from_secs)
}
