//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.infora.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".infora.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record store settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Report settings.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Connection settings for the hosted record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend project (the REST API lives under `/rest/v1`).
    #[serde(default)]
    pub url: String,

    /// API key sent as both `apikey` and bearer token.
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_devices_table")]
    pub devices_table: String,

    #[serde(default = "default_requests_table")]
    pub requests_table: String,

    #[serde(default = "default_issues_table")]
    pub issues_table: String,

    #[serde(default = "default_notifications_table")]
    pub notifications_table: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
            devices_table: default_devices_table(),
            requests_table: default_requests_table(),
            issues_table: default_issues_table(),
            notifications_table: default_notifications_table(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_devices_table() -> String {
    "devices".to_string()
}

fn default_requests_table() -> String {
    "device_requests".to_string()
}

fn default_issues_table() -> String {
    "issue_reports".to_string()
}

fn default_notifications_table() -> String {
    "notifications".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Warranty period, in years from the purchase date.
    #[serde(default = "default_warranty_years")]
    pub warranty_years: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            warranty_years: default_warranty_years(),
        }
    }
}

fn default_warranty_years() -> u32 {
    4
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and the environment variables clap reads for them)
    /// take precedence over config file settings. Only explicitly provided
    /// values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.backend_url {
            self.backend.url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref key) = args.api_key {
            self.backend.api_key = key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
        if let Some(years) = args.warranty_years {
            self.reports.warranty_years = years;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.devices_table, "devices");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.reports.warranty_years, 4);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[backend]
url = "https://project.example.co"
api_key = "service-key"
timeout_seconds = 10
devices_table = "assets"

[reports]
warranty_years = 3
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.backend.url, "https://project.example.co");
        assert_eq!(config.backend.api_key, "service-key");
        assert_eq!(config.backend.timeout_seconds, 10);
        assert_eq!(config.backend.devices_table, "assets");
        assert_eq!(config.backend.requests_table, "device_requests");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.reports.warranty_years, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[reports]"));
    }
}
