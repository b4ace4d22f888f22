//! Error types for bucket-fs

use std::path::PathBuf;

use crate::adapter::AdapterError;

/// Result type for bucket-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bucket-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Store operation failed at '{path}': {source}")]
    Store {
        path: String,
        #[source]
        source: AdapterError,
    },

    #[error("File not found at path: {path}")]
    NotFound { path: String },

    #[error("Contents of {path} are not valid UTF-8")]
    NotUtf8 { path: String },

    #[error("Filesystem owning {path} is no longer available")]
    Detached { path: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an adapter failure with the path the operation targeted.
    ///
    /// A missing object surfaces as [`Error::NotFound`]; everything else keeps
    /// the adapter error as its source.
    pub fn store(path: impl Into<String>, source: AdapterError) -> Self {
        let path = path.into();
        match source {
            AdapterError::NotFound { .. } => Self::NotFound { path },
            source => Self::Store { path, source },
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
