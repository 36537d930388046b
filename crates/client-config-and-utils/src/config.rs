//! Client configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default REST API base URL (overridable at compile time via CCSMS_API_URL).
pub const DEFAULT_API_URL: &str = match option_env!("CCSMS_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000/api",
};

/// Public key used when requesting a push registration token.
pub const DEFAULT_PUSH_PUBLIC_KEY: Option<&str> = option_env!("CCSMS_PUSH_PUBLIC_KEY");

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Request timeout applied to every backend call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// REST API base URL, without trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Public key for push token requests. Push stays disabled when absent.
    #[serde(default = "default_push_public_key")]
    pub push_public_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_push_public_key() -> Option<String> {
    DEFAULT_PUSH_PUBLIC_KEY.map(|s| s.to_string())
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
            push_public_key: default_push_public_key(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults overridden from the environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load the config file if present, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.api_url = config.api_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Some(level) = non_empty_env("CCSMS_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(url) = non_empty_env("CCSMS_API_URL") {
            self.api_url = url;
        }
    }

    /// The API base URL, parsed.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    /// The public push key, if one is configured and looks usable.
    ///
    /// VAPID-style keys are URL-safe base64; anything else is treated as absent.
    pub fn push_public_key(&self) -> Option<&str> {
        self.push_public_key
            .as_deref()
            .map(str::trim)
            .filter(|key| {
                !key.is_empty()
                    && key
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '=')
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
