//! JSON settings persistence.

use std::path::{Path, PathBuf};

use ripley_models::WorkspaceConfig;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// File name of the settings document.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Application directory name under the platform data dir.
const APP_DIR_NAME: &str = "RipleyFlow";

/// Default workspace: `~/Documents/RipleyFlow`, or empty if there is no home.
pub fn default_workspace_dir() -> String {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .map(|docs| docs.join(APP_DIR_NAME).to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Loads and saves [`WorkspaceConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Store settings under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store settings in `RIPLEY_SETTINGS_DIR` or the platform local data dir.
    pub fn from_env() -> StorageResult<Self> {
        if let Ok(dir) = std::env::var("RIPLEY_SETTINGS_DIR") {
            return Ok(Self::new(dir));
        }
        let base = dirs::data_local_dir()
            .ok_or_else(|| StorageError::config_error("no local data directory on this platform"))?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    /// Path of the settings file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE_NAME)
    }

    /// Load settings, falling back to defaults when no file exists.
    pub async fn load(&self) -> StorageResult<WorkspaceConfig> {
        let path = self.path();
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let config: WorkspaceConfig = serde_json::from_str(&content)?;
                debug!("Loaded settings from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                Ok(WorkspaceConfig::new(default_workspace_dir()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save settings, creating the workspace directory if it is missing.
    pub async fn save(&self, config: &WorkspaceConfig) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).await?;

        if !config.is_unset() {
            let workspace = Path::new(config.directory());
            if !fs::try_exists(workspace).await.unwrap_or(false) {
                info!("Creating workspace directory {}", workspace.display());
                fs::create_dir_all(workspace).await?;
            }
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.path(), json).await?;
        info!("Saved settings to {}", self.path().display());
        Ok(())
    }
}
