//! Client error types.

use ripley_media::MediaError;
use ripley_storage::StorageError;
use thiserror::Error;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure reported by a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("File does not exist: {0}")]
    NotFound(String),

    #[error("{0}")]
    TooLarge(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("{0}")]
    Remote(String),
}

impl BackendError {
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Whether the failure means the user cancelled the operation.
    ///
    /// Remote failures arrive as text, so the message is checked too.
    pub fn is_cancellation(&self) -> bool {
        match self {
            BackendError::Cancelled => true,
            other => {
                let message = other.to_string().to_ascii_lowercase();
                message.contains("cancelled") || message.contains("canceled")
            }
        }
    }
}

impl From<MediaError> for BackendError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Cancelled => BackendError::Cancelled,
            MediaError::InputNotFound(path) => BackendError::NotFound(path.display().to_string()),
            other => BackendError::Remote(other.to_string()),
        }
    }
}

impl From<StorageError> for BackendError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => BackendError::NotFound(path),
            StorageError::AccessDenied(path) => BackendError::AccessDenied(path),
            err @ StorageError::TooLarge { .. } => BackendError::TooLarge(err.to_string()),
            other => BackendError::Remote(other.to_string()),
        }
    }
}

/// Errors returned to UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected before reaching the backend
    #[error("{0}")]
    Validation(String),

    #[error("An operation is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_detection() {
        assert!(BackendError::Cancelled.is_cancellation());
        assert!(BackendError::remote("FFmpeg process was Cancelled").is_cancellation());
        assert!(BackendError::remote("job canceled upstream").is_cancellation());
        assert!(!BackendError::remote("Input file does not exist").is_cancellation());
    }

    #[test]
    fn test_media_error_mapping() {
        assert_eq!(BackendError::from(MediaError::Cancelled), BackendError::Cancelled);
        let err = BackendError::from(MediaError::ffmpeg_failed("exited with 1", None, Some(1)));
        assert_eq!(err, BackendError::remote("FFmpeg command failed: exited with 1"));
    }

    #[test]
    fn test_storage_error_mapping() {
        let err = BackendError::from(StorageError::too_large(200 * 1024 * 1024, 100 * 1024 * 1024));
        assert!(matches!(err, BackendError::TooLarge(_)));
        assert_eq!(
            BackendError::from(StorageError::not_found("/a.mp4")),
            BackendError::NotFound("/a.mp4".to_string())
        );
    }
}
