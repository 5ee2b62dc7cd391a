//! Operation identifiers, kinds and requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Correlation identifier attached to a submitted operation and to every
/// progress notification it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub String);

impl OperationId {
    /// Generate a new random operation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of preview to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    /// Single JPEG frame
    #[default]
    Thumbnail,
    /// Short MP4 clip
    Clip,
}

impl PreviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewKind::Thumbnail => "thumbnail",
            PreviewKind::Clip => "clip",
        }
    }

    /// File name suffix appended to the input's stem.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            PreviewKind::Thumbnail => "_preview.jpg",
            PreviewKind::Clip => "_preview.mp4",
        }
    }
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreviewKind {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thumbnail" => Ok(PreviewKind::Thumbnail),
            "clip" => Ok(PreviewKind::Clip),
            other => Err(ModelError::invalid_preview_kind(other)),
        }
    }
}

/// What a submitted operation does, without its paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    /// Re-encode into another container format
    Convert { format: String },
    /// Extract a thumbnail or short clip
    Preview {
        preview_kind: PreviewKind,
        timestamp_seconds: f64,
    },
    /// Remove background noise from the audio track
    Denoise,
}

impl OperationKind {
    /// Build a convert operation, validating the format tag.
    pub fn convert(format: impl AsRef<str>) -> ModelResult<Self> {
        let format = format.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ModelError::invalid_format(format));
        }
        Ok(OperationKind::Convert { format })
    }

    /// Build a preview operation.
    pub fn preview(preview_kind: PreviewKind, timestamp_seconds: f64) -> Self {
        OperationKind::Preview {
            preview_kind,
            timestamp_seconds: timestamp_seconds.max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Convert { .. } => "convert",
            OperationKind::Preview { .. } => "preview",
            OperationKind::Denoise => "denoise",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A submitted operation. Created at submission, discarded at the
/// terminal transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub id: OperationId,
    pub input_path: String,
    /// Derived destination path
    pub target_path: String,
    #[serde(flatten)]
    pub kind: OperationKind,
}

impl OperationRequest {
    /// Create a request with a fresh ID.
    pub fn new(input_path: impl Into<String>, target_path: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            id: OperationId::new(),
            input_path: input_path.into(),
            target_path: target_path.into(),
            kind,
        }
    }
}
