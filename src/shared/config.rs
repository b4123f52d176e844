//! Application configuration. Storage path, listen address, notification service.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding todos.db. Read from TODO_API_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Listen host. Read from TODO_API_HOST.
    #[serde(default)]
    pub host: Option<String>,

    /// Listen port. Read from TODO_API_PORT or plain PORT.
    #[serde(default)]
    pub port: Option<u16>,

    // ─────────────────────────────────────────────────────────────────────────
    // Notification Service Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// Notification API base URL. Read from TODO_API_NOTIFICATION_API_URL.
    #[serde(default)]
    pub notification_api_url: Option<String>,

    /// Notification API bearer token. Read from TODO_API_NOTIFICATION_API_KEY.
    #[serde(default)]
    pub notification_api_key: Option<String>,

    /// Request timeout in seconds (default 30). Read from TODO_API_NOTIFICATION_TIMEOUT_SECS.
    #[serde(default)]
    pub notification_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Load from `.env`, `TODO_API_*` environment variables and the optional
    /// file named by `TODO_API_CONFIG`.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let file = std::env::var("TODO_API_CONFIG").ok();
        let mut cfg = Self::build(file.as_deref())?;
        // PORT is read directly (no TODO_API_ prefix) for hosting platforms that inject it
        if let Ok(s) = std::env::var("PORT") {
            if let Ok(port) = s.parse::<u16>() {
                cfg.port = Some(port);
            }
        }
        Ok(cfg)
    }

    /// Build from an optional config file plus `TODO_API_*` environment variables.
    /// Environment wins over the file.
    pub fn build(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        c = c.add_source(config::Environment::with_prefix("TODO_API"));
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    /// `host:port` to bind the HTTP listener to.
    pub fn bind_addr(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(
            self.notification_timeout_secs
                .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT_SECS),
        )
    }

    /// Returns true if a notification service URL is configured (the API key may be empty).
    pub fn is_notification_configured(&self) -> bool {
        self.notification_api_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
