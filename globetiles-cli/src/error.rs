//! CLI error type.

use globetiles::logging::LoggingError;
use globetiles::GridError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Tile grid or configuration error.
    #[error("{0}")]
    Grid(#[from] GridError),

    /// Logging could not be set up.
    #[error("{0}")]
    Logging(#[from] LoggingError),

    /// JSON output failed.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::Grid(e) if e.is_out_of_range() => 3,
            _ => 1,
        }
    }
}
