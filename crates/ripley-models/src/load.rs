//! Resource load outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a renderable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSource {
    /// Bytes embedded in a `data:` URI
    InlineData,
    /// URI pointing at the file on disk
    DirectReference,
}

/// Why a resource cannot be rendered in-process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum LoadFailureReason {
    /// Extension is known not to render in the built-in viewer
    ExternalViewerRequired(String),
    NotFound,
    TooLarge,
    AccessDenied,
    DecodeUnsupported,
    Unknown(String),
}

impl LoadFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadFailureReason::ExternalViewerRequired(_) => "external_viewer_required",
            LoadFailureReason::NotFound => "not_found",
            LoadFailureReason::TooLarge => "too_large",
            LoadFailureReason::AccessDenied => "access_denied",
            LoadFailureReason::DecodeUnsupported => "decode_unsupported",
            LoadFailureReason::Unknown(_) => "unknown",
        }
    }

    /// Message telling the user what to do next.
    pub fn remediation(&self) -> String {
        match self {
            LoadFailureReason::ExternalViewerRequired(ext) if ext.is_empty() => {
                "File type is not recognised by the built-in player. \
                 Click \"Open in External Player\" to view it, or convert it to MP4."
                    .to_string()
            }
            LoadFailureReason::ExternalViewerRequired(ext) => format!(
                "{} format may not be supported by the built-in player. \
                 Click \"Open in External Player\" to view it, or convert it to MP4.",
                ext.to_ascii_uppercase()
            ),
            LoadFailureReason::NotFound => {
                "Video file not found. The file may have been moved or deleted.".to_string()
            }
            LoadFailureReason::TooLarge => {
                "File is too large to display here. Open it in an external player instead.".to_string()
            }
            LoadFailureReason::AccessDenied => {
                "Access to the file was denied. Check its permissions or open it in an external player."
                    .to_string()
            }
            LoadFailureReason::DecodeUnsupported => {
                "Video codec not supported or corrupted file. Try converting to MP4 format.".to_string()
            }
            LoadFailureReason::Unknown(detail) => {
                format!("Unable to load media: {}. Try opening it in an external player.", detail)
            }
        }
    }
}

impl fmt::Display for LoadFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.remediation())
    }
}

/// Error reported by the render target after a reference was handed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderError {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
    Other(String),
}

impl RenderError {
    /// Map a numeric media error code (1-4) to a render error.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RenderError::Aborted,
            2 => RenderError::Network,
            3 => RenderError::Decode,
            4 => RenderError::SourceNotSupported,
            other => RenderError::Other(format!("media error code {}", other)),
        }
    }
}

impl From<RenderError> for LoadFailureReason {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Aborted => LoadFailureReason::Unknown("Video loading was aborted".to_string()),
            RenderError::Network => {
                LoadFailureReason::Unknown("Network error while loading video".to_string())
            }
            RenderError::Decode | RenderError::SourceNotSupported => LoadFailureReason::DecodeUnsupported,
            RenderError::Other(detail) => LoadFailureReason::Unknown(detail),
        }
    }
}

/// Outcome of resolving a path for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Renderable { uri: String, source: ResourceSource },
    Unplayable { reason: LoadFailureReason },
}

/// Load result for one path. Recomputed wholesale for every new path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub path: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

impl LoadResult {
    pub fn renderable(path: impl Into<String>, uri: impl Into<String>, source: ResourceSource) -> Self {
        Self {
            path: path.into(),
            outcome: LoadOutcome::Renderable {
                uri: uri.into(),
                source,
            },
        }
    }

    pub fn unplayable(path: impl Into<String>, reason: LoadFailureReason) -> Self {
        Self {
            path: path.into(),
            outcome: LoadOutcome::Unplayable { reason },
        }
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Renderable { .. })
    }

    /// Renderable URI, if any.
    pub fn uri(&self) -> Option<&str> {
        match &self.outcome {
            LoadOutcome::Renderable { uri, .. } => Some(uri),
            LoadOutcome::Unplayable { .. } => None,
        }
    }

    /// Failure reason, if unplayable.
    pub fn reason(&self) -> Option<&LoadFailureReason> {
        match &self.outcome {
            LoadOutcome::Renderable { .. } => None,
            LoadOutcome::Unplayable { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_errors_reclassify() {
        assert_eq!(
            LoadFailureReason::from(RenderError::from_code(3)),
            LoadFailureReason::DecodeUnsupported
        );
        assert_eq!(
            LoadFailureReason::from(RenderError::from_code(4)),
            LoadFailureReason::DecodeUnsupported
        );
        assert!(matches!(
            LoadFailureReason::from(RenderError::from_code(2)),
            LoadFailureReason::Unknown(_)
        ));
        assert_eq!(RenderError::from_code(9), RenderError::Other("media error code 9".to_string()));
    }

    #[test]
    fn test_remediation_messages() {
        let reason = LoadFailureReason::ExternalViewerRequired("mkv".to_string());
        assert!(reason.remediation().starts_with("MKV format"));
        assert!(reason.remediation().contains("Open in External Player"));
        assert!(LoadFailureReason::NotFound.remediation().contains("moved or deleted"));

        let untyped = LoadFailureReason::ExternalViewerRequired(String::new());
        assert!(untyped.remediation().starts_with("File type is not recognised"));
    }

    #[test]
    fn test_result_accessors() {
        let ok = LoadResult::renderable("/a.mp4", "file:///a.mp4", ResourceSource::DirectReference);
        assert!(ok.is_renderable());
        assert_eq!(ok.uri(), Some("file:///a.mp4"));
        assert!(ok.reason().is_none());

        let bad = LoadResult::unplayable("/a.avi", LoadFailureReason::TooLarge);
        assert!(!bad.is_renderable());
        assert_eq!(bad.reason(), Some(&LoadFailureReason::TooLarge));
    }
}
