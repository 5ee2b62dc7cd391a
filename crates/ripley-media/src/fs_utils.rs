//! Filesystem checks shared by the media pipelines.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Smallest file size accepted as a valid pipeline output.
pub const MIN_OUTPUT_BYTES: u64 = 1000;

/// Fail with `InputNotFound` unless `path` exists.
pub async fn require_input(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    if fs::try_exists(path).await.unwrap_or(false) {
        Ok(())
    } else {
        Err(MediaError::InputNotFound(path.to_path_buf()))
    }
}

/// Create the parent directory of `path` if needed.
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| MediaError::InvalidOutputPath(path.to_path_buf()))?;

    if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await.unwrap_or(false) {
        tracing::debug!("Creating output directory {}", parent.display());
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Check that a produced file exists and is at least [`MIN_OUTPUT_BYTES`].
///
/// `label` names the file in error messages, e.g. "Output video file".
pub async fn require_valid_output(path: impl AsRef<Path>, label: &str) -> MediaResult<u64> {
    let path = path.as_ref();
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MediaError::corrupt_output(format!("{} was not created", label)));
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.len() < MIN_OUTPUT_BYTES {
        return Err(MediaError::corrupt_output(format!(
            "{} appears to be corrupted (size < {} bytes)",
            label, MIN_OUTPUT_BYTES
        )));
    }
    Ok(metadata.len())
}
