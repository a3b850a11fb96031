//! Configuration module for Stowage.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Result, StowageError};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Maximum accepted request body size in megabytes.
    ///
    /// This is a transport limit only; uploads are not otherwise validated.
    #[serde(default = "default_max_body_size")]
    pub max_body_size_mb: u64,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    3000
}

fn default_static_path() -> String {
    "public".to_string()
}

fn default_max_body_size() -> u64 {
    100
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
            max_body_size_mb: default_max_body_size(),
        }
    }
}

/// Object store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend kind ("s3" or "memory").
    #[serde(default = "default_backend")]
    pub backend: String,
    /// S3-compatible endpoint, also the base of public object URLs.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Region name sent with signed requests.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing (`endpoint/bucket/key`) for API requests.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_backend() -> String {
    "s3".to_string()
}

fn default_endpoint() -> String {
    "https://s3.filebase.com".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_path_style() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_endpoint(),
            region: default_region(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            path_style: default_path_style(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/stowage.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Command-line client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Stowage server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Path of the local profile holding the session record.
    ///
    /// Empty means the per-user default under the platform config directory.
    #[serde(default)]
    pub profile_path: String,
    /// Timezone for displaying dates (e.g., "UTC", "Europe/Berlin").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Displayed storage quota in megabytes. Never enforced.
    #[serde(default = "default_storage_limit")]
    pub storage_limit_mb: u64,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_storage_limit() -> u64 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            profile_path: String::new(),
            timezone: default_timezone(),
            storage_limit_mb: default_storage_limit(),
        }
    }
}

impl ClientConfig {
    /// Resolve the profile path, falling back to `<config dir>/stowage/profile.json`.
    pub fn resolved_profile_path(&self) -> PathBuf {
        if !self.profile_path.is_empty() {
            return PathBuf::from(&self.profile_path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stowage")
            .join("profile.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Object store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StowageError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StowageError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STOWAGE_S3_ENDPOINT`, `STOWAGE_S3_REGION`, `STOWAGE_S3_BUCKET`
    /// - `STOWAGE_S3_ACCESS_KEY`, `STOWAGE_S3_SECRET_KEY`
    /// - `STOWAGE_SERVER_URL`, `STOWAGE_PROFILE`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get("STOWAGE_S3_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Some(v) = get("STOWAGE_S3_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = get("STOWAGE_S3_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("STOWAGE_S3_ACCESS_KEY") {
            self.storage.access_key = v;
        }
        if let Some(v) = get("STOWAGE_S3_SECRET_KEY") {
            self.storage.secret_key = v;
        }
        if let Some(v) = get("STOWAGE_SERVER_URL") {
            self.client.server_url = v;
        }
        if let Some(v) = get("STOWAGE_PROFILE") {
            self.client.profile_path = v;
        }
    }

    /// Validate the server-side configuration.
    ///
    /// Returns an error if:
    /// - The storage backend is unknown
    /// - The S3 backend is selected without bucket or credentials
    pub fn validate(&self) -> Result<()> {
        match self.storage.backend.as_str() {
            "memory" => Ok(()),
            "s3" => {
                let mut missing = Vec::new();
                if self.storage.bucket.is_empty() {
                    missing.push("bucket");
                }
                if self.storage.access_key.is_empty() {
                    missing.push("access_key");
                }
                if self.storage.secret_key.is_empty() {
                    missing.push("secret_key");
                }
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(StowageError::Config(format!(
                        "S3 storage is missing {}. Set it in config.toml or via STOWAGE_S3_* environment variables.",
                        missing.join(", ")
                    )))
                }
            }
            other => Err(StowageError::Config(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}
