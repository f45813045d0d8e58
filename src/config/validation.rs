//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, LoggerSettings, ProviderConfig, ProviderKind, PushSettings,
    Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must not be empty
    /// - URL must be a PostgreSQL connection string
    /// - Max connections must be greater than 0
    /// - Min connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    /// The device registry only runs on PostgreSQL
    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl ProviderConfig {
    /// Validate a provider block
    ///
    /// # Validation Rules
    /// - Timeout must be greater than 0
    /// - If an endpoint override is set, it must be an http(s) URL
    pub fn validate(&self, field_prefix: &str) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                field: format!("{}.timeout_seconds", field_prefix),
                message: "Timeout must be greater than 0 seconds.".to_string(),
            });
        }

        if let Some(api_url) = &self.api_url {
            let valid = Url::parse(api_url)
                .map(|url| url.scheme() == "https" || url.scheme() == "http")
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::ValidationError {
                    field: format!("{}.api_url", field_prefix),
                    message: format!("Invalid endpoint URL '{}'", api_url),
                });
            }
        }

        Ok(())
    }
}

impl PushSettings {
    /// Validate push settings
    ///
    /// Every configured block is checked for shape; only the active provider
    /// is required to carry an auth token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.onesignal.validate("push.onesignal")?;
        self.zeropush.validate("push.zeropush")?;

        if self.active_config().auth_token().is_none() {
            let provider = match self.active {
                ProviderKind::OneSignal => "OneSignal",
                ProviderKind::ZeroPush => "ZeroPush",
            };
            return Err(ConfigError::missing_credential(provider, "AUTH_TOKEN"));
        }

        Ok(())
    }
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.logger.validate()?;
        self.push.validate()?;
        Ok(())
    }
}
