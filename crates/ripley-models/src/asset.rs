//! Selected media asset.

use serde::{Deserialize, Serialize};

/// Extensions offered when picking a source video.
pub const SELECTABLE_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v"];

/// A local media file chosen by the user.
///
/// Immutable once selected; a new selection replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Path as given by the file picker
    pub path: String,
    /// File name shown to the user
    pub display_name: String,
    /// File size in bytes
    pub size_bytes: u64,
}

impl MediaAsset {
    /// Create a new asset.
    pub fn new(path: impl Into<String>, display_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            size_bytes,
        }
    }

    /// Lowercased extension of the asset's file name, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str());
        match name.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < name.len() => Some(name[idx + 1..].to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Whether the asset has one of the selectable video extensions.
    pub fn is_selectable(&self) -> bool {
        self.extension()
            .map(|ext| SELECTABLE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Human readable size in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}
