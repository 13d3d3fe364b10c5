//! Configuration management for the storedesk admin console

use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// Environment variable prefix; nested keys use `__`, e.g. `STOREDESK__API__BASE_URL`
pub const ENV_PREFIX: &str = "STOREDESK";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Admin credentials for non-interactive commands
    #[serde(default)]
    pub auth: AuthConfig,

    /// Dashboard behaviour (page sizes, timers, thresholds)
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional per-request timeout in seconds; `None` waits indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Optional connect timeout in seconds; `None` waits indefinitely
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

/// Admin credentials
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Admin email
    #[serde(default)]
    pub email: Option<String>,

    /// Admin password
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Dashboard behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Rows per page for client-paginated lists (products, customers) and staff
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Rows per page requested from the orders endpoint
    #[serde(default = "default_order_page_size")]
    pub order_page_size: u32,

    /// How long a notification stays visible
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Interval of the simulated image-upload progress counter
    #[serde(default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,

    /// Products with stock strictly below this are reported as low stock
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_page_size() -> usize {
    10
}

const fn default_order_page_size() -> u32 {
    20
}

const fn default_notification_ttl_ms() -> u64 {
    3000
}

const fn default_progress_tick_ms() -> u64 {
    100
}

const fn default_low_stock_threshold() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            order_page_size: default_order_page_size(),
            notification_ttl_ms: default_notification_ttl_ms(),
            progress_tick_ms: default_progress_tick_ms(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `STOREDESK__*` environment variables
    ///
    /// Without an explicit path, `storedesk.toml` in the working directory is used
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, parsed, or fails validation.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("storedesk").required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(base_url = %config.base_url(), "configuration loaded");
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending key.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::Configuration {
                message: format!("api.base_url must be an http(s) URL, got '{base}'"),
            });
        }
        if self.dashboard.page_size == 0 || self.dashboard.order_page_size == 0 {
            return Err(crate::Error::Configuration {
                message: "dashboard page sizes must be at least 1".to_string(),
            });
        }
        if self.dashboard.progress_tick_ms == 0 {
            return Err(crate::Error::Configuration {
                message: "dashboard.progress_tick_ms must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(config.api.request_timeout_secs.is_none());
        assert!(config.api.connect_timeout_secs.is_none());
        assert!(config.auth.email.is_none());
        assert_eq!(config.dashboard.page_size, 10);
        assert_eq!(config.dashboard.order_page_size, 20);
        assert_eq!(config.dashboard.notification_ttl_ms, 3000);
        assert_eq!(config.dashboard.progress_tick_ms, 100);
        assert_eq!(config.dashboard.low_stock_threshold, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://shop.example.com/"},
            "dashboard": {"page_size": 25}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.base_url(), "https://shop.example.com");
        assert_eq!(config.dashboard.page_size, 25);
        assert_eq!(config.dashboard.order_page_size, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8000".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.dashboard.page_size = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_is_redacted_and_not_serialized() {
        let auth = AuthConfig {
            email: Some("admin@example.com".to_string()),
            password: Some("hunter2".to_string()),
        };

        let debug = format!("{auth:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));

        let json = serde_json::to_string(&auth).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storedesk.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://10.0.0.5:9000\"\nconnect_timeout_secs = 5\n\n[dashboard]\norder_page_size = 50"
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.api.connect_timeout_secs, Some(5));
        assert!(config.api.request_timeout_secs.is_none());
        assert_eq!(config.dashboard.order_page_size, 50);
        assert_eq!(config.dashboard.page_size, 10);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, crate::Error::Configuration { .. }));
    }
}
