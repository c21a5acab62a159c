use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Path '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Corrupted metadata file '{}': {reason}", .path.display())]
    CorruptMetadata { path: PathBuf, reason: String },

    #[error("Invalid query: {0}")]
    MalformedQuery(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, HelperError>;
