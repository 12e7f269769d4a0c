//! Configuration module for Credo.

use serde::Deserialize;
use std::path::Path;

use crate::{CredoError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means permissive development mode.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/credo.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// JWT token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// JWT signing secret. Must be set for production use.
    #[serde(default)]
    pub secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiry in days.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_days: u64,
}

fn default_access_expiry() -> u64 {
    900
}

fn default_refresh_expiry() -> u64 {
    30
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiry_secs: default_access_expiry(),
            refresh_token_expiry_days: default_refresh_expiry(),
        }
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Sender address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Mail provider HTTP API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Mail provider API key. When unset, messages are logged instead of sent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-send timeout in seconds.
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

fn default_from_address() -> String {
    "no-reply@localhost".to_string()
}

fn default_from_name() -> String {
    "Credo".to_string()
}

fn default_api_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_mail_timeout() -> u64 {
    10
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            from_name: default_from_name(),
            api_url: default_api_url(),
            api_key: None,
            timeout_secs: default_mail_timeout(),
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
    "logs/credo.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT settings.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CredoError::Config(e.to_string()))
    }
}
