//! Configuration loading and defaults.

use crate::ServerId;
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plugin configuration, loaded once at startup. Not reloadable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Virtual server ids whose traffic is logged. Empty means every server
    /// the host exposes.
    pub servers: Vec<ServerId>,

    /// Chat prefix that requests history playback.
    pub history_command: String,

    /// Chat prefix that keeps a message out of the log.
    pub offtopic_command: String,

    /// Directory holding one `<channel>.log` file per channel.
    pub history_directory: PathBuf,

    /// IANA timezone name used to render and compare log timestamps.
    /// Absent means the process-local zone.
    pub timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            history_command: "!history".into(),
            offtopic_command: "!offtopic".into(),
            history_directory: "logs".into(),
            timezone: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys fall back to the
    /// defaults above.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Load {
            path: path.display().to_string(),
            source: Arc::new(source),
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// Whether events from `server` should be handled.
    pub fn covers_server(&self, server: ServerId) -> bool {
        self.servers.is_empty() || self.servers.contains(&server)
    }
}
