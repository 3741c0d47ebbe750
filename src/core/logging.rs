//! Structured logging system
//!
//! JSON and text formats, stdout or size-rotated file output, built on the
//! tracing ecosystem.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logger instance that keeps the non-blocking writer guard alive
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the global tracing subscriber from configuration
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = match config.output.as_str() {
            "stdout" => {
                let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
                (non_blocking, Some(guard))
            }
            "file" => {
                let log_file = config
                    .log_file
                    .as_ref()
                    .context("log_file must be specified when output is 'file'")?;

                if let Some(parent) = log_file.parent() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create log directory")?;
                }

                let appender = RollingFileAppender::new(
                    log_file.clone(),
                    config.max_file_size,
                    config.max_backups,
                );

                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                (non_blocking, Some(guard))
            }
            _ => {
                anyhow::bail!("Invalid output configuration: {}", config.output);
            }
        };

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .boxed(),
            _ => {
                anyhow::bail!("Invalid format configuration: {}", config.format);
            }
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}

/// File appender that rotates based on file size
///
/// Backups are shifted `log.1 -> log.2 -> ...` up to `max_backups`; the
/// oldest backup is dropped on overflow.
pub struct RollingFileAppender {
    path: PathBuf,
    max_file_size: usize,
    max_backups: usize,
    current_file: Mutex<Option<std::fs::File>>,
    current_size: AtomicUsize,
}

impl RollingFileAppender {
    pub fn new(path: PathBuf, max_file_size: usize, max_backups: usize) -> Self {
        Self {
            path,
            max_file_size,
            max_backups,
            current_file: Mutex::new(None),
            current_size: AtomicUsize::new(0),
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&self) -> std::io::Result<()> {
        // Close the active file before renaming underneath it
        let mut file_guard = self.current_file.lock().unwrap();
        *file_guard = None;
        drop(file_guard);

        for i in (1..self.max_backups).rev() {
            let from = self.backup_path(i);
            if from.exists() {
                std::fs::rename(&from, self.backup_path(i + 1))?;
            }
        }

        if self.path.exists() {
            std::fs::rename(&self.path, self.backup_path(1))?;
        }

        self.current_size.store(0, Ordering::SeqCst);

        Ok(())
    }

    fn with_file<R>(
        &self,
        f: impl FnOnce(&mut std::fs::File) -> std::io::Result<R>,
    ) -> std::io::Result<R> {
        let mut file_guard = self.current_file.lock().unwrap();

        if file_guard.is_none() {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.current_size
                .store(file.metadata()?.len() as usize, Ordering::SeqCst);
            *file_guard = Some(file);
        }

        f(file_guard.as_mut().unwrap())
    }
}

impl Write for RollingFileAppender {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.current_size.load(Ordering::SeqCst) + buf.len() > self.max_file_size {
            self.rotate()?;
        }

        let written = self.with_file(|file| file.write(buf))?;
        self.current_size.fetch_add(written, Ordering::SeqCst);

        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("INFO"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_rolling_appender_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panel.log");
        let mut appender = RollingFileAppender::new(path.clone(), 1024, 3);

        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rolling_appender_rotates_on_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panel.log");
        // Tiny limit so the second write forces a rotation
        let mut appender = RollingFileAppender::new(path.clone(), 16, 3);

        appender.write_all(b"0123456789abcdef").unwrap();
        appender.write_all(b"next").unwrap();
        appender.flush().unwrap();

        let backup = dir.path().join("panel.log.1");
        assert!(backup.exists());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "0123456789abcdef");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "next");
    }
}
