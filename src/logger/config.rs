//! Runtime logger configuration, produced from `[logger]` settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

use crate::logger::error::LoggerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// Level name: trace, debug, info, warn or error
    pub level: String,
}

impl LoggerConfig {
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self, LoggerError> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the level, the file output and that something is enabled
    pub fn validate(&self) -> Result<(), LoggerError> {
        self.parse_level()?;
        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config(
                "at least one output (console or file) must be enabled",
            ));
        }

        Ok(())
    }

    pub fn parse_level(&self) -> Result<Level, LoggerError> {
        Level::from_str(self.level.trim()).map_err(|_| {
            LoggerError::config(format!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.level
            ))
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colors, honored only when stdout is a terminal
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Keep existing content instead of truncating on start
    pub append: bool,
    pub format: LogFormat,
}

impl FileConfig {
    pub fn new(
        enabled: bool,
        path: PathBuf,
        append: bool,
        format: LogFormat,
    ) -> Result<Self, LoggerError> {
        let config = Self {
            enabled,
            path,
            append,
            format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pure check; the writer creates missing directories
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.enabled && self.path.as_os_str().is_empty() {
            return Err(LoggerError::config(
                "file path cannot be empty when file output is enabled",
            ));
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/push.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

/// Line format of the file output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggerError::config(format!(
                "invalid log format '{}', expected one of full, compact, json",
                other
            ))),
        }
    }
}
