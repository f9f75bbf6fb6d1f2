//! Configuration for the pairing proxy.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Proxy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Linking bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Pairing flow configuration
    #[serde(default)]
    pub pairing: PairingConfig,

    /// Session storage configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Linking bridge REST API URL
    #[serde(default = "default_bridge_api_url")]
    pub api_url: String,

    /// Name shown in the phone's linked devices list
    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_browser")]
    pub browser: String,

    #[serde(default = "default_browser_version")]
    pub browser_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    /// Region assumed for numbers without a country code (ISO 3166 alpha-2)
    #[serde(default)]
    pub default_region: Option<String>,

    /// Minimum digits a normalized number must have
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,

    /// Upper bound on each call to the linking bridge
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Directory under which per-request session directories are created
    #[serde(default = "default_session_root")]
    pub root: PathBuf,

    /// Keep the session directory after a code is issued
    #[serde(default)]
    pub keep_on_success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: default_bridge_api_url(),
            device_name: default_device_name(),
            browser: default_browser(),
            browser_version: default_browser_version(),
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            default_region: None,
            min_digits: default_min_digits(),
            timeout: default_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: default_session_root(),
            keep_on_success: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_bridge_api_url() -> String {
    "http://link-bridge:3000".into()
}

fn default_device_name() -> String {
    "Chrome (Linux)".into()
}

fn default_browser() -> String {
    "Chrome".into()
}

fn default_browser_version() -> String {
    "121".into()
}

fn default_min_digits() -> usize {
    6
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_session_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl PairingConfig {
    /// The configured default region, treating an empty value as unset.
    pub fn default_region(&self) -> Option<&str> {
        self.default_region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit, 65536);
        assert_eq!(config.pairing.min_digits, 6);
        assert_eq!(config.pairing.timeout, Duration::from_secs(30));
        assert!(config.pairing.default_region().is_none());
        assert!(!config.session.keep_on_success);
        assert_eq!(config.log.format, "pretty");
    }

    #[test]
    fn test_empty_region_is_unset() {
        let pairing = PairingConfig {
            default_region: Some("  ".into()),
            ..Default::default()
        };
        assert!(pairing.default_region().is_none());

        let pairing = PairingConfig {
            default_region: Some("LK".into()),
            ..Default::default()
        };
        assert_eq!(pairing.default_region(), Some("LK"));
    }

    #[test]
    fn test_deserialize_from_map() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "pairing": { "default_region": "US", "timeout": "5s" },
            "session": { "root": "/var/tmp/pairing", "keep_on_success": true }
        }))
        .unwrap();

        assert_eq!(config.pairing.default_region(), Some("US"));
        assert_eq!(config.pairing.timeout, Duration::from_secs(5));
        assert_eq!(config.session.root, PathBuf::from("/var/tmp/pairing"));
        assert!(config.session.keep_on_success);
        assert_eq!(config.bridge.api_url, "http://link-bridge:3000");
    }
}
