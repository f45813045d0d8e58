//! Configuration settings structures for push-notifications
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "push-notifications".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/push.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_push_timeout() -> u64 {
    30
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Diesel database connection configuration for the device registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

// ============================================================================
// Push Provider Configuration
// ============================================================================

/// Push backend selected for the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProviderKind {
    /// OneSignal REST API
    #[default]
    OneSignal,
    /// ZeroPush REST API
    ZeroPush,
}

impl ProviderKind {
    /// Convert the provider kind to its configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OneSignal => "onesignal",
            ProviderKind::ZeroPush => "zeropush",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "onesignal" => Ok(ProviderKind::OneSignal),
            "zeropush" => Ok(ProviderKind::ZeroPush),
            _ => Err(ConfigError::ValidationError {
                field: "push.active".to_string(),
                message: format!(
                    "Unknown push provider '{}'. Valid providers are: onesignal, zeropush",
                    s
                ),
            }),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials and endpoint settings for a single push provider
///
/// The upper-case `AUTH_TOKEN` / `APP_ID` spellings are accepted so that
/// existing settings blocks can be reused as-is. When both spellings end up
/// in the merged configuration (e.g. `AUTH_TOKEN` in a file plus a
/// `PUSH_NOTIFICATIONS_PUSH__ONESIGNAL__AUTH_TOKEN` override), the
/// lower-case key wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProviderConfig")]
pub struct ProviderConfig {
    /// Server-side API token (required)
    pub auth_token: Option<String>,

    /// Provider application identifier
    pub app_id: Option<String>,

    /// Override for the provider's notification endpoint
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// On-disk shape of a provider block, legacy keys kept apart
#[derive(Debug, Deserialize)]
struct RawProviderConfig {
    #[serde(default)]
    auth_token: Option<String>,

    #[serde(default, rename = "AUTH_TOKEN")]
    legacy_auth_token: Option<String>,

    #[serde(default)]
    app_id: Option<String>,

    #[serde(default, rename = "APP_ID")]
    legacy_app_id: Option<String>,

    #[serde(default)]
    api_url: Option<String>,

    #[serde(default = "default_push_timeout")]
    timeout_seconds: u64,
}

impl From<RawProviderConfig> for ProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        Self {
            auth_token: raw.auth_token.or(raw.legacy_auth_token),
            app_id: raw.app_id.or(raw.legacy_app_id),
            api_url: raw.api_url,
            timeout_seconds: raw.timeout_seconds,
        }
    }
}

impl ProviderConfig {
    /// Create a configuration holding only an auth token
    pub fn with_auth_token<S: Into<String>>(auth_token: S) -> Self {
        Self {
            auth_token: Some(auth_token.into()),
            ..Default::default()
        }
    }

    /// Returns the auth token when it is present and not blank
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            app_id: None,
            api_url: None,
            timeout_seconds: default_push_timeout(),
        }
    }
}

/// Push provider settings: which backend is active and how to reach each one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PushSettings {
    /// The active provider for this deployment
    #[serde(default)]
    pub active: ProviderKind,

    /// OneSignal settings
    #[serde(default)]
    pub onesignal: ProviderConfig,

    /// ZeroPush settings
    #[serde(default)]
    pub zeropush: ProviderConfig,
}

impl PushSettings {
    /// Returns the configuration block of the active provider
    pub fn active_config(&self) -> &ProviderConfig {
        self.config_for(self.active)
    }

    /// Returns the configuration block for the given provider
    pub fn config_for(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::OneSignal => &self.onesignal,
            ProviderKind::ZeroPush => &self.zeropush,
        }
    }
}

// ============================================================================
// Logger Settings (compatible with existing LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Device registry database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Push provider configuration
    #[serde(default)]
    pub push: PushSettings,
}
