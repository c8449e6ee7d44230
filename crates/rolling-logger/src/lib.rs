//! Rolling File Logger
//!
//! Installs a process-wide `tracing` subscriber that writes to stderr and to a
//! size-rotated log file under `<log_dir>/<name>.log`. Rotation and pruning of
//! old files are done by `logroller`; writes reach the file through a
//! `tracing_appender` background worker.
//!
//! Records emitted through the `log` facade are forwarded into `tracing`, so
//! library code can use either.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use logroller::{LogRoller, LogRollerBuilder, Rotation, RotationSize};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Path of the live log file, set once the logger is installed
static ACTIVE_LOG: OnceLock<PathBuf> = OnceLock::new();

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Size in megabytes after which the live file is rotated
    pub max_file_size_mb: u64,
    /// Number of rotated files kept besides the live one
    pub max_files: u64,
    /// Default filter directive, used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 5,
            max_files: 5,
            level: "info".to_string(),
        }
    }
}

/// Logger errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to create rotating log file: {0}")]
    Roller(String),

    #[error("failed to install logger: {0}")]
    Init(String),

    #[error("logger not initialized")]
    NotInitialized,
}

/// Initialize logging with default settings
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<WorkerGuard, LoggerError> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize logging with explicit settings
///
/// Fails if a global subscriber is already installed.
pub fn init_logger_with(
    log_dir: impl Into<PathBuf>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<WorkerGuard, LoggerError> {
    let log_dir = log_dir.into();
    let file_name = log_file_name(app_name);
    let roller = build_roller(&log_dir, &file_name, &config)?;
    let (file_writer, guard) = tracing_appender::non_blocking(roller);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime)
        .with_target(true)
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    let _ = ACTIVE_LOG.set(log_dir.join(file_name));
    Ok(guard)
}

/// Path of the live log file, if the logger is installed
pub fn current_log_file() -> Option<&'static Path> {
    ACTIVE_LOG.get().map(PathBuf::as_path)
}

/// Log an info-level lifecycle message
pub fn info(msg: &str) -> Result<(), LoggerError> {
    if ACTIVE_LOG.get().is_none() {
        return Err(LoggerError::NotInitialized);
    }
    log::info!("{}", msg);
    Ok(())
}

/// Log an error-level lifecycle message
pub fn error(msg: &str) -> Result<(), LoggerError> {
    if ACTIVE_LOG.get().is_none() {
        return Err(LoggerError::NotInitialized);
    }
    log::error!("{}", msg);
    Ok(())
}

fn log_file_name(app_name: &str) -> String {
    format!("{}.log", app_name)
}

/// Size-rotated writer for `<log_dir>/<file_name>`, creating `log_dir` if needed
pub fn build_roller(log_dir: &Path, file_name: &str, config: &LoggerConfig) -> Result<LogRoller, LoggerError> {
    std::fs::create_dir_all(log_dir)?;

    LogRollerBuilder::new(log_dir, Path::new(file_name))
        .rotation(Rotation::SizeBased(RotationSize::MB(config.max_file_size_mb)))
        .max_keep_files(config.max_files)
        .build()
        .map_err(|e| LoggerError::Roller(e.to_string()))
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn config(max_files: u64) -> LoggerConfig {
        LoggerConfig {
            max_file_size_mb: 1,
            max_files,
            ..LoggerConfig::default()
        }
    }

    /// Files in `dir` belonging to the `app.log` set
    fn log_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("app.log"))
            })
            .collect()
    }

    #[test]
    fn test_writes_to_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut roller = build_roller(dir.path(), "app.log", &config(3)).unwrap();

        roller.write_all(b"hello\n").unwrap();
        roller.flush().unwrap();

        let files = log_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "hello\n");
    }

    #[test]
    fn test_creates_missing_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("var").join("logs");

        let mut roller = build_roller(&nested, "app.log", &config(1)).unwrap();
        roller.write_all(b"started\n").unwrap();
        roller.flush().unwrap();

        assert!(nested.is_dir());
        assert_eq!(log_files(&nested).len(), 1);
    }

    #[test]
    fn test_rotation_keeps_bounded_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut roller = build_roller(dir.path(), "app.log", &config(2)).unwrap();

        // 4 MiB against a 1 MiB limit forces several rotations
        let line = vec![b'x'; 64 * 1024];
        for _ in 0..64 {
            roller.write_all(&line).unwrap();
            roller.write_all(b"\n").unwrap();
        }
        roller.flush().unwrap();

        let files = log_files(dir.path());
        assert!(files.len() > 1, "expected rotated files, got {:?}", files);
        assert!(files.len() <= 3, "old files not pruned: {:?}", files);

        let total: u64 = files.iter().map(|f| fs::metadata(f).unwrap().len()).sum();
        assert!(total < 4 * 1024 * 1024);
    }

    #[test]
    fn test_helpers_require_init() {
        if current_log_file().is_none() {
            assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
            assert!(matches!(error("x"), Err(LoggerError::NotInitialized)));
        }
    }

    #[test]
    fn test_error_messages() {
        let err = LoggerError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.to_string(), "log file error: denied");
        assert_eq!(LoggerError::NotInitialized.to_string(), "logger not initialized");
    }
}
