//! Model parsing errors.

use thiserror::Error;

/// Result type for model conversions.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while parsing model values from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid preview type: {0}")]
    InvalidPreviewKind(String),

    #[error("Invalid output format: {0}")]
    InvalidFormat(String),
}

impl ModelError {
    pub fn invalid_preview_kind(value: impl Into<String>) -> Self {
        Self::InvalidPreviewKind(value.into())
    }

    pub fn invalid_format(value: impl Into<String>) -> Self {
        Self::InvalidFormat(value.into())
    }
}
