//! Local media file access.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use ripley_models::MediaAsset;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Largest file embedded as a `data:` URI.
pub const DEFAULT_INLINE_CEILING_BYTES: u64 = 100 * 1024 * 1024;

/// MIME type for a path, by extension.
pub fn mime_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Read a file into a base64 `data:` URI.
///
/// Files above `ceiling_bytes` are refused with [`StorageError::TooLarge`]
/// before any bytes are read.
pub async fn read_as_data_uri(path: &str, ceiling_bytes: u64) -> StorageResult<String> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| StorageError::from_io(path, e))?;

    if metadata.len() > ceiling_bytes {
        return Err(StorageError::too_large(metadata.len(), ceiling_bytes));
    }

    let bytes = fs::read(path).await.map_err(|e| StorageError::from_io(path, e))?;
    debug!(bytes = bytes.len(), "Encoding {} as data URI", path);

    Ok(format!(
        "data:{};base64,{}",
        mime_type_for(path),
        general_purpose::STANDARD.encode(&bytes)
    ))
}

/// Verify `path` exists and return it with forward slashes.
pub async fn canonical_path(path: &str) -> StorageResult<String> {
    match fs::try_exists(path).await {
        Ok(true) => Ok(path.replace('\\', "/")),
        Ok(false) => Err(StorageError::not_found(path)),
        Err(e) => Err(StorageError::from_io(path, e)),
    }
}

/// Describe a selected file.
pub async fn describe_asset(path: &str) -> StorageResult<MediaAsset> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| StorageError::from_io(path, e))?;
    let display_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("video")
        .to_string();
    Ok(MediaAsset::new(path, display_name, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("/a/B.MP4"), "video/mp4");
        assert_eq!(mime_type_for("/a/b.ogv"), "video/ogg");
        assert_eq!(mime_type_for("/a/b_preview.jpg"), "image/jpeg");
        assert_eq!(mime_type_for("/a/noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_data_uri_encoding() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("frame.png");
        fs::write(&path, b"abc").await.unwrap();

        let uri = read_as_data_uri(&path.to_string_lossy(), 1024).await.unwrap();
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_ceiling_refuses_large_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.mp4");
        fs::write(&path, vec![0u8; 64]).await.unwrap();

        let err = read_as_data_uri(&path.to_string_lossy(), 32).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = read_as_data_uri("/nonexistent/ripley/a.mp4", 1024).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = canonical_path("/nonexistent/ripley/a.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_is_access_denied() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        let path = locked.join("a.mp4");
        std::fs::write(&path, b"abc").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users bypass permission bits
        let bypassed = std::fs::metadata(&path).is_ok();
        let result = canonical_path(&path.to_string_lossy()).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !bypassed {
            assert!(matches!(result, Err(StorageError::AccessDenied(_))));
        }
    }

    #[tokio::test]
    async fn test_describe_asset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clip.mov");
        fs::write(&path, vec![1u8; 10]).await.unwrap();

        let asset = describe_asset(&path.to_string_lossy()).await.unwrap();
        assert_eq!(asset.display_name, "clip.mov");
        assert_eq!(asset.size_bytes, 10);
    }
}
