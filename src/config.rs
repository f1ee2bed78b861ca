//! Client configuration.
//!
//! Defaults suit the hosted backend; each value can be overridden from the environment:
//!
//! - `TEAM_REG_API_BASE_URL`: backend root (default `http://localhost:8000`)
//! - `TEAM_REG_REQUEST_TIMEOUT_SECS`: per-request timeout (default 15)
//! - `TEAM_REG_SEARCH_QUIET_MS`: debounce quiet period for member search (default 300)

use std::time::Duration;

/// Default backend root.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout (15 seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default debounce quiet period (300 ms).
const DEFAULT_QUIET_PERIOD_MS: u64 = 300;

/// Shortest query that triggers a remote lookup.
const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Configuration for the debounced member search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Delay after the last input change before a lookup fires.
    pub quiet_period: Duration,

    /// Minimum number of characters (after trimming) for a lookup.
    ///
    /// Shorter input clears results without a remote call.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        SearchConfig {
            quiet_period: Duration::from_millis(DEFAULT_QUIET_PERIOD_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }
}

/// Configuration for talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL all endpoint paths are appended to.
    pub api_base_url: String,

    /// Timeout applied to every request.
    pub request_timeout: Duration,

    pub search: SearchConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    /// Creates a configuration for the given backend with default timings.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        ClientConfig {
            api_base_url: api_base_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            search: SearchConfig::new(),
        }
    }

    /// Creates a `ClientConfig` from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("TEAM_REG_API_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = lookup("TEAM_REG_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let quiet_ms = lookup("TEAM_REG_SEARCH_QUIET_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_QUIET_PERIOD_MS);

        ClientConfig {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            search: SearchConfig::new().with_quiet_period(Duration::from_millis(quiet_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let config = ClientConfig::default();

        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.search.quiet_period, Duration::from_millis(300));
        assert_eq!(config.search.min_query_len, 3);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("TEAM_REG_API_BASE_URL", "https://api.example.com"),
            ("TEAM_REG_REQUEST_TIMEOUT_SECS", "5"),
            ("TEAM_REG_SEARCH_QUIET_MS", "150"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.search.quiet_period, Duration::from_millis(150));
        assert_eq!(config.search.min_query_len, 3);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let config = ClientConfig::from_lookup(|k| match k {
            "TEAM_REG_API_BASE_URL" => Some("   ".to_string()),
            _ => Some("soon".to_string()),
        });

        assert_eq!(config, ClientConfig::default());
    }
}
