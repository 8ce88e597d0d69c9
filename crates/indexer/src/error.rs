use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("file too large: {path} ({size} bytes > {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid project path: {0}")]
    InvalidPath(String),
}
