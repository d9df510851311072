//! Cache configuration sourced from the environment

use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the application cache retention, e.g. "5m" or "1h30m".
/// Fractional units such as "1.5h" are not accepted.
pub const CACHE_RETENTION_ENV: &str = "ACM_GATEWAY_APPCACHE_RETENTION";

/// Retention used when none, or an invalid one, is configured
pub const DEFAULT_CACHE_RETENTION: Duration = Duration::from_secs(5 * 60);

/// Interval of the background sweep of expired cache entries. Independent of
/// the retention so the sweep cost stays bounded however long entries live.
pub const JANITOR_INTERVAL: Duration = Duration::from_secs(3 * 60);

/// Application cache configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a fetched application is served from the cache
    pub retention: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_CACHE_RETENTION,
        }
    }
}

impl CacheConfig {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention: sanitize_retention(Some(retention)),
        }
    }

    /// Load the configuration from [`CACHE_RETENTION_ENV`]
    pub fn from_env() -> Self {
        let raw = std::env::var(CACHE_RETENTION_ENV).ok();
        let config = Self {
            retention: parse_retention(raw.as_deref()),
        };
        info!(
            retention_minutes = config.retention.as_secs_f64() / 60.0,
            "Configuring application cache to store application data for {:.2}m",
            config.retention.as_secs_f64() / 60.0
        );
        config
    }
}

/// Parse a humantime duration, falling back to [`DEFAULT_CACHE_RETENTION`]
/// when the value is absent, unparseable or zero.
pub fn parse_retention(raw: Option<&str>) -> Duration {
    let parsed = raw.and_then(|value| match humantime::parse_duration(value.trim()) {
        Ok(duration) => Some(duration),
        Err(e) => {
            warn!(value, error = %e, "Invalid application cache retention, using default");
            None
        }
    });
    sanitize_retention(parsed)
}

fn sanitize_retention(retention: Option<Duration>) -> Duration {
    match retention {
        Some(retention) if !retention.is_zero() => retention,
        _ => DEFAULT_CACHE_RETENTION,
    }
}
