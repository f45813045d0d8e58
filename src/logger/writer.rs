//! File writer for the logger

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Shared, buffered log file writer
///
/// On a failed write the writer switches to stderr for the rest of the
/// process lifetime so that log lines are never silently lost.
#[derive(Clone)]
pub struct LogFileWriter {
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    file: BufWriter<File>,
    fallback_mode: bool,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                fallback_mode: false,
            })),
        })
    }

    /// Check if the writer has fallen back to stderr
    pub fn is_in_fallback_mode(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.fallback_mode)
            .unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard {
            state: self.state.clone(),
        }
    }
}

/// Per-event handle onto the shared file
pub struct LogFileGuard {
    state: Arc<Mutex<WriterState>>,
}

impl Write for LogFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        match state.file.write(buf) {
            Ok(written) => Ok(written),
            Err(e) => {
                state.fallback_mode = true;
                eprintln!("[Logger] File write failed, falling back to stderr: {}", e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().flush();
        }

        state.file.flush()
    }
}

impl Drop for LogFileGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
