//! Error types for ArchiveFiles

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ArchiveFiles
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Root folder {} does not exist or can not be read: {reason}", .path.display())]
    PathNotFound { path: PathBuf, reason: String },

    #[error("Specified archive file: {} already exists and is not a file.", .path.display())]
    InvalidTarget { path: PathBuf },

    #[error(
        "Specified archive file: {} can not be created because it can not be accessed: {reason}",
        .path.display()
    )]
    Access { path: PathBuf, reason: String },

    #[error("Unable to locate executable '{tool}': {reason}")]
    ToolNotFound { tool: String, reason: String },

    #[error("Archive creation failed for archive file: {} See log for details.", .path.display())]
    ArchiveCreation { path: PathBuf },

    #[error("No archiver registered for strategy: {0}")]
    StrategyNotRegistered(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
