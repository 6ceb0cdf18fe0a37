use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Core library errors
#[derive(Error, Debug)]
pub enum DiskfaceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Refusing to delete '{path}': not inside scan root '{root}'")]
    PathContainment { path: PathBuf, root: PathBuf },

    #[error(transparent)]
    InvalidPattern(#[from] InvalidPatternError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl DiskfaceError {
    /// Wrap an I/O error for `path`, mapping "not found" to `PathNotFound`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DiskfaceError::PathNotFound(path)
        } else {
            DiskfaceError::Io { path, source }
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A glob pattern that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid pattern '{pattern}': {reason}")]
pub struct InvalidPatternError {
    pub pattern: String,
    pub reason: String,
}

/// A per-entry failure recorded during traversal. Never aborts a scan.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{}: {reason}", path.display())]
pub struct TraversalError {
    pub path: PathBuf,
    pub reason: String,
}

/// A removal that failed for one filesystem node.
#[derive(Error, Debug)]
#[error("Failed to remove '{}': {source}", path.display())]
pub struct DeletionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DiskfaceError>;
