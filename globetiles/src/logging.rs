//! Tracing subscriber setup for binaries.
//!
//! The library itself only emits `tracing` events. Binaries call
//! [`init_logging`] once at startup to route them to stderr and, optionally,
//! to a log file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_DIRECTIVE: &str = "globetiles=info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },

    /// The log file path has no file name.
    #[error("invalid log file path: {0}")]
    InvalidPath(PathBuf),

    /// The log directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive applied when `RUST_LOG` is unset.
    pub default_directive: String,

    /// Also write events to this file.
    pub log_file: Option<PathBuf>,

    /// Colorize stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
            log_file: None,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Set the default filter directive.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// Set the log file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Installs the global tracing subscriber.
///
/// Returns the file writer's guard when a log file is configured; dropping it
/// flushes and stops the background writer, so keep it alive for the life of
/// the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(&config.default_directive)?;
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false);

    let Some(path) = &config.log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()?;
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.clone()))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    Ok(Some(guard))
}

/// `RUST_LOG` if set and valid, else `directive`.
fn build_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidDirective {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}
