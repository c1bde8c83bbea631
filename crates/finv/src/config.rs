//! Endpoint and timeout configuration.

use std::time::Duration;

pub const DEFAULT_OPTIONS_URL: &str = "https://query1.finance.yahoo.com/v7/finance/options/";
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration for [`crate::Finv`].
///
/// Every field can be overridden through the environment, see [`FinvConfig::from_env`].
#[derive(Clone, Debug)]
pub struct FinvConfig {
    /// Base of the options endpoint (profile and quote), the symbol is appended.
    pub options_url: String,
    /// Base of the chart endpoint (history, dividends, splits), the symbol is appended.
    pub chart_url: String,
    /// Endpoint answering with the session cookie.
    pub cookie_url: String,
    /// Endpoint answering with the crumb token.
    pub crumb_url: String,
    /// Connect and read timeout applied to every request.
    pub timeout: Duration,
    /// Default log filter used by binaries when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for FinvConfig {
    fn default() -> Self {
        Self {
            options_url: DEFAULT_OPTIONS_URL.to_string(),
            chart_url: DEFAULT_CHART_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            crumb_url: DEFAULT_CRUMB_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl FinvConfig {
    /// Build a configuration from `FINV_*` environment variables, falling back
    /// to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_ms: u64 = lookup("FINV_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            options_url: lookup("FINV_QUERY_V7").unwrap_or(defaults.options_url),
            chart_url: lookup("FINV_QUERY_V8").unwrap_or(defaults.chart_url),
            cookie_url: lookup("FINV_COOKIE_URL").unwrap_or(defaults.cookie_url),
            crumb_url: lookup("FINV_CRUMB_URL").unwrap_or(defaults.crumb_url),
            timeout: Duration::from_millis(timeout_ms),
            log_level: lookup("FINV_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_point_at_live_service() {
        let config = FinvConfig::default();
        assert_eq!(config.options_url, DEFAULT_OPTIONS_URL);
        assert_eq!(config.chart_url, DEFAULT_CHART_URL);
        assert_eq!(config.cookie_url, "https://fc.yahoo.com");
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FINV_QUERY_V8", "http://localhost:9000/chart/"),
            ("FINV_TIMEOUT_MS", "250"),
            ("FINV_LOG_LEVEL", "debug"),
        ]);
        let config = FinvConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.chart_url, "http://localhost:9000/chart/");
        assert_eq!(config.options_url, DEFAULT_OPTIONS_URL);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let config = FinvConfig::from_lookup(|k| {
            (k == "FINV_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }
}
