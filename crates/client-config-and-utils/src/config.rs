//! Client configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API base URL (can be overridden at compile time via DECISIV_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("DECISIV_API_URL") {
    Some(url) => url,
    None => "http://localhost:8001",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for the background reconciliation of pending sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Delay between listing fetches, in milliseconds.
    pub interval_ms: u64,
    /// Fetches allowed per pending source before giving up on it.
    pub max_attempts: u32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            max_attempts: 15,
        }
    }
}

impl ReconcileSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the analytics service (without the `/api` suffix).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for every network call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: default_log_level(),
            reconcile: ReconcileSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            debug!(path = %config_path.display(), "Loading config file");
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn load_from_env(&mut self) {
        if let Ok(api_url) = std::env::var("DECISIV_API_URL") {
            if !api_url.trim().is_empty() {
                self.api_url = api_url;
            }
        }
        if let Ok(log_level) = std::env::var("DECISIV_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Check the URL, timeout and reconcile budget.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.reconcile.max_attempts == 0 {
            return Err(CoreError::Config(
                "reconcile.max_attempts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
