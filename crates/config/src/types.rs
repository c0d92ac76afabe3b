use serde::Deserialize;

/// Top-level configuration for the dashboard service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub views: ViewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level filter, e.g. "info" or "api=debug,services=debug"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Admin credentials accepted by the login route.
///
/// Passwords are stored as hex-encoded sha256 digests, never in the clear.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCredential {
    pub email: String,
    pub password_sha256: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub admins: Vec<AdminCredential>,
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            session_ttl_secs: 8 * 60 * 60,
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Optional JSON seed file loaded into the in-memory store at startup
    pub seed_path: Option<String>,
}

/// Snapshot cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached view snapshots, in seconds
    pub snapshot_ttl_secs: u64,
    /// Maximum number of cached snapshots
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_ttl_secs: 60,
            max_entries: 64,
        }
    }
}

/// Per-view tunables for the aggregation pipeline.
///
/// The customer-segment thresholds and the revenue-trend baseline are
/// deployment choices, not code constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// A customer with at most this many lifetime orders is "first-time"
    pub first_time_max_orders: u32,
    /// A customer with at least this many lifetime orders is "repeat"
    pub repeat_min_orders: u32,
    /// Fixed baseline for the monthly revenue trend. When unset, the
    /// observed maximum across months is the baseline (largest bar = 100%).
    pub monthly_revenue_target: Option<f64>,
    /// How many trailing calendar months the revenue trend covers
    pub revenue_trend_months: u32,
    /// How many recent orders the overview page lists
    pub recent_orders_limit: usize,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            first_time_max_orders: 1,
            repeat_min_orders: 11,
            monthly_revenue_target: None,
            revenue_trend_months: 6,
            recent_orders_limit: 20,
        }
    }
}
