use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the alert insights crates.
///
/// Parsing and classification never fail; only the fetch boundary and the
/// output layer return these.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A source file exists but could not be read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The primary alert source does not exist.
    #[error("Alert source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Retrieving a source took longer than the configured deadline.
    #[error("Timed out after {timeout_secs}s reading {path}")]
    FetchTimeout { path: PathBuf, timeout_secs: u64 },

    /// The summary could not be rendered as JSON.
    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;
