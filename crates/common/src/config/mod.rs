//! Configuration management for the SubSphere client
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with SUBSPHERE__)
//! - Configuration files (config/default, config/{env}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Persisted session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Fixed origin every request is issued against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds; unset keeps the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Directory holding the persisted token and user record
    #[serde(default = "default_session_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Email labelled as administrator when the server sends no role claim
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_base_url() -> String { crate::DEFAULT_API_BASE_URL.to_string() }
fn default_admin_email() -> String { crate::DEFAULT_ADMIN_EMAIL.to_string() }
fn default_log_level() -> String { "warn".to_string() }

fn default_session_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".subsphere"),
        None => PathBuf::from(".subsphere"),
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { dir: default_session_dir() }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { admin_email: default_admin_email() }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("SUBSPHERE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // e.g., SUBSPHERE__API__BASE_URL=http://localhost:8080/api
            .add_source(
                Environment::with_prefix("SUBSPHERE")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific config file, still honouring environment overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("SUBSPHERE")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, crate::DEFAULT_API_BASE_URL);
        assert_eq!(config.auth.admin_email, crate::DEFAULT_ADMIN_EMAIL);
        assert!(config.request_timeout().is_none());
        assert!(config.session.dir.ends_with(".subsphere"));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = AppConfig::default();
        config.api.base_url = "http://localhost:8080/api/".to_string();
        assert_eq!(config.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_timeout_conversion() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = Some(15);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }
}
