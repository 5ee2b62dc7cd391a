//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found. Place it at {0} or add it to PATH")]
    FfmpegNotFound(String),

    #[error("Deep-filter not found. Place it at {0} or add it to PATH")]
    DeepFilterNotFound(String),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Deep-filter failed: {message}")]
    DeepFilterFailed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("Input file does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid output path: {0}")]
    InvalidOutputPath(PathBuf),

    #[error("{stage}: {message}")]
    StageFailed { stage: &'static str, message: String },

    #[error("{0}")]
    CorruptOutput(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a deep-filter failure error.
    pub fn deep_filter_failed(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::DeepFilterFailed {
            message: message.into(),
            exit_code,
        }
    }

    /// Wrap an error with the pipeline stage that produced it.
    ///
    /// Cancellation is passed through untouched.
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            MediaError::Cancelled => MediaError::Cancelled,
            other => MediaError::StageFailed {
                stage,
                message: other.to_string(),
            },
        }
    }

    /// Create a corrupt output error.
    pub fn corrupt_output(message: impl Into<String>) -> Self {
        Self::CorruptOutput(message.into())
    }

    /// Check if this error is a user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Cancelled)
    }
}
