use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that prevent a project configuration from being used
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read or written
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected schema
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to encode the config for writing
    #[error("Failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),

    /// Decoded config violates a structural rule
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConfigError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
