//! # Zoomer Config
//!
//! `zoomer-config.json` in the project root: extension allow-list, ordered
//! segment-boundary patterns, and the review fields shown per segment. A
//! missing file is bootstrapped with Go defaults.

mod config;
mod env;
mod error;

pub use config::{
    config_path, load_config, load_or_bootstrap, write_config, ConfigSource, FieldDefinition,
    FieldKind, ProjectConfig, CONFIG_FILE_NAME, DEFAULT_METHOD_PATTERN,
};
pub use env::{
    flush_interval, parse_flush_interval_secs, DEFAULT_FLUSH_INTERVAL_SECS, FLUSH_INTERVAL_ENV,
};
pub use error::{ConfigError, Result};
