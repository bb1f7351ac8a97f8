//! Top-level error types for chatscribe.

use std::path::PathBuf;
use std::sync::Arc;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum.
///
/// Only `Config` and `Startup` are fatal, and only at construction time.
/// Everything that can fail while handling an event is reported and swallowed
/// by the service so one bad message or one unreadable log never takes the
/// plugin down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create log directory {path}: {source}")]
    Startup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to append to log for channel {channel}: {source}")]
    Append {
        channel: String,
        source: std::io::Error,
    },

    #[error("unreadable timestamp: {value:?}")]
    Timestamp { value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from {path}: {source}")]
    Load {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}
