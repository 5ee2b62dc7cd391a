//! Media tool configuration.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

/// Locations of external tools and scratch space.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory holding bundled `ffmpeg/` and `deep-filter/` subdirectories
    pub binaries_dir: Option<PathBuf>,
    /// Scratch root for multi-stage pipelines
    pub work_dir: PathBuf,
    /// Per-process timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binaries_dir: None,
            work_dir: std::env::temp_dir(),
            timeout_secs: None,
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            binaries_dir: std::env::var("RIPLEY_BINARIES_DIR").ok().map(PathBuf::from),
            work_dir: std::env::var("RIPLEY_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            timeout_secs: std::env::var("RIPLEY_PROCESS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Locate the ffmpeg binary: bundled copy first, then PATH.
    pub fn ffmpeg_path(&self) -> MediaResult<PathBuf> {
        let bundled = self.bundled("ffmpeg");
        locate(bundled.as_deref(), "ffmpeg")
            .ok_or_else(|| MediaError::FfmpegNotFound(display_hint(bundled.as_deref(), "ffmpeg")))
    }

    /// Locate the deep-filter binary: bundled copy first, then PATH.
    pub fn deep_filter_path(&self) -> MediaResult<PathBuf> {
        let bundled = self.bundled("deep-filter");
        locate(bundled.as_deref(), "deep-filter").ok_or_else(|| {
            MediaError::DeepFilterNotFound(display_hint(bundled.as_deref(), "deep-filter"))
        })
    }

    fn bundled(&self, tool: &str) -> Option<PathBuf> {
        self.binaries_dir
            .as_ref()
            .map(|dir| dir.join(tool).join(executable_name(tool)))
    }
}

/// Platform executable name for a tool.
pub fn executable_name(tool: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    }
}

fn locate(bundled: Option<&Path>, tool: &str) -> Option<PathBuf> {
    match bundled {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        _ => which::which(tool).ok(),
    }
}

fn display_hint(bundled: Option<&Path>, tool: &str) -> String {
    bundled
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| executable_name(tool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_binary_preferred() {
        let dir = TempDir::new().unwrap();
        let tool_dir = dir.path().join("deep-filter");
        std::fs::create_dir_all(&tool_dir).unwrap();
        let binary = tool_dir.join(executable_name("deep-filter"));
        std::fs::write(&binary, b"#!/bin/sh\n").unwrap();

        let config = MediaConfig {
            binaries_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.deep_filter_path().unwrap(), binary);
    }

    #[test]
    fn test_missing_tool_reports_expected_location() {
        let dir = TempDir::new().unwrap();
        let config = MediaConfig {
            binaries_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let tool = "ripley-tool-that-does-not-exist";
        assert!(locate(config.bundled(tool).as_deref(), tool).is_none());
        assert!(display_hint(config.bundled(tool).as_deref(), tool).contains(tool));
    }
}
