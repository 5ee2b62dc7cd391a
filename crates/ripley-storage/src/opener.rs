//! Open files with the platform's default application.

use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::error::{StorageError, StorageResult};

fn opener_command(path: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", path]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Hand `path` to the system viewer. Does not wait for the viewer to exit.
pub async fn open_externally(path: &str) -> StorageResult<()> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => return Err(StorageError::not_found(path)),
        Err(e) => return Err(StorageError::from_io(path, e)),
    }

    info!("Opening {} externally", path);
    opener_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| StorageError::open_failed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_not_opened() {
        let err = open_externally("/nonexistent/ripley/clip.mkv").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_opener_targets_path() {
        let cmd = opener_command("/tmp/a.mkv");
        let args: Vec<_> = cmd.as_std().get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args.last().map(String::as_str), Some("/tmp/a.mkv"));
    }
}
