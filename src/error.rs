use std::path::PathBuf;
use thiserror::Error;

use crate::types::{ConfigLevel, Position};

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}({line},{column}): {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
        /// The offending line and the byte offset of the failure within it.
        source_line: String,
        offset: usize,
    },

    #[error("{message} (column {})", .position.column)]
    InvalidName { message: String, position: Position },

    #[error("Multi-valued property '{key}' found. Use SetAll instead.")]
    MultiValued { key: String },

    #[error(
        "Cannot write across multiple files{}; specify a target level matching one of the loaded files",
        .level.map(|l| format!(" (no {l} file loaded)")).unwrap_or_default()
    )]
    CrossFileWrite { level: Option<ConfigLevel> },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid value matcher '{expr}': {source}")]
    InvalidMatcher {
        expr: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(key: impl ToString, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
