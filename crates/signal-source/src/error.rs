//! Signal Source Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a signal source before or while it runs.
///
/// Per-row and per-poll problems are logged and skipped instead.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Replay file could not be read
    #[error("Failed to read replay file {path}: {source}")]
    ReplayFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Replay file header could not be parsed
    #[error("Invalid replay CSV header: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP client could not be built or a request failed
    #[error("Telemetry API error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source configuration is unusable
    #[error("Invalid source configuration: {0}")]
    InvalidConfig(String),
}
