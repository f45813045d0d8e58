//! Logger Module
//!
//! A logging setup based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output with multiple formats (Full, Compact, JSON)
//! - Fallback to stderr when the log file becomes unwritable

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use self::config::*;
pub use error::LoggerError;

use std::io::IsTerminal;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use writer::LogFileWriter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global subscriber with the given configuration
///
/// Fails if a global subscriber has already been installed.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // File layer must come BEFORE the console layer, otherwise ANSI codes from
    // span field formatting leak into the file output.
    // See: https://github.com/tokio-rs/tracing/issues/1817
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::subscriber(e.to_string()))?;

    Ok(())
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = LogFileWriter::new(config)?;

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_layer_creates_log_file() {
        let dir = TempDir::new().unwrap();
        let config = FileConfig {
            enabled: true,
            path: dir.path().join("push.log"),
            append: true,
            format: LogFormat::Compact,
        };

        assert!(file_layer(&config).is_ok());
        assert!(config.path.exists());
    }

    #[test]
    fn test_init_logger_rejects_invalid_config() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(init_logger(config).is_err());
    }
}
