//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File does not exist: {0}")]
    NotFound(String),

    #[error(
        "File is too large ({size_mb} MB, limit {limit_mb} MB) to load inline. \
         Please use 'Open in External Player' instead."
    )]
    TooLarge { size_mb: u64, limit_mb: u64 },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Failed to locate settings directory: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    pub fn too_large(size_bytes: u64, limit_bytes: u64) -> Self {
        const MB: u64 = 1024 * 1024;
        Self::TooLarge {
            size_mb: size_bytes.div_ceil(MB),
            limit_mb: limit_bytes / MB,
        }
    }

    /// Map an IO error on `path` to the most specific variant.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied(path.to_string()),
            _ => Self::Io(err),
        }
    }
}
