//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::PlacementConfig;
use common::ProductId;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on in-memory stores
/// - `DB_MAX_CONNECTIONS`: pool size (default: `10`)
/// - `PAYMENT_TIMEOUT_MS`: payment call bound (default: `5000`)
/// - `NOTIFICATION_TIMEOUT_MS`: notification call bound (default: `2000`)
/// - `PAYMENT_LATENCY_MS`: simulated gateway latency (default: `50`)
/// - `SEED_INVENTORY`: `product_id:quantity` pairs, comma separated, stocked
///   at start-up when running on in-memory stores (default: none)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub payment_timeout: Duration,
    pub notification_timeout: Duration,
    pub payment_latency: Duration,
    pub seed_inventory: Vec<(ProductId, i64)>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            payment_timeout: millis("PAYMENT_TIMEOUT_MS", defaults.payment_timeout),
            notification_timeout: millis("NOTIFICATION_TIMEOUT_MS", defaults.notification_timeout),
            payment_latency: millis("PAYMENT_LATENCY_MS", defaults.payment_latency),
            seed_inventory: lookup("SEED_INVENTORY")
                .map(|v| parse_seed_inventory(&v))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeouts handed to the placement orchestrator.
    pub fn placement(&self) -> PlacementConfig {
        PlacementConfig {
            payment_timeout: self.payment_timeout,
            notification_timeout: self.notification_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            db_max_connections: 10,
            payment_timeout: Duration::from_millis(5000),
            notification_timeout: Duration::from_millis(2000),
            payment_latency: Duration::from_millis(50),
            seed_inventory: Vec::new(),
        }
    }
}

/// Parses `id:qty,id:qty`. Malformed or negative entries are skipped.
fn parse_seed_inventory(value: &str) -> Vec<(ProductId, i64)> {
    value
        .split(',')
        .filter_map(|entry| {
            let (id, quantity) = entry.trim().split_once(':')?;
            let id = id.trim().parse().ok()?;
            let quantity: i64 = quantity.trim().parse().ok()?;
            (quantity >= 0).then_some((id, quantity))
        })
        .collect()
}
