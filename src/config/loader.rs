//! Configuration loader for push-notifications
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "PUSH_NOTIFICATIONS_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "PUSH_NOTIFICATIONS_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "PUSH_NOTIFICATIONS";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base default configuration (required)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `PUSH_NOTIFICATIONS_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current application environment
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if both `PUSH_NOTIFICATIONS_CONFIG_DIR` and
    /// `PUSH_NOTIFICATIONS_CONFIG_FILE` are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{} and {} cannot both be set. Use {} for layered configuration or \
                 {} for a single configuration file.",
                CONFIG_DIR_ENV, CONFIG_FILE_ENV, CONFIG_DIR_ENV, CONFIG_FILE_ENV
            )));
        }

        Ok(Self {
            config_dir: config_dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Get the current application environment
    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load configuration from all sources and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` is not found (when using layered loading)
    /// - Configuration parsing fails
    /// - Configuration validation fails, including a missing auth token
    ///   for the active push provider
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        tracing::debug!(
            environment = %self.environment,
            provider = %settings.push.active,
            "Configuration loaded"
        );

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // PUSH_NOTIFICATIONS_PUSH__ONESIGNAL__AUTH_TOKEN -> push.onesignal.auth_token
        Self::add_env_source(builder)
            .build()
            .map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
        ))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}
