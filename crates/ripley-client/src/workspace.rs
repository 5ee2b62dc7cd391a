//! Process-wide workspace settings.

use std::sync::Arc;

use ripley_models::WorkspaceConfig;
use tracing::{info, warn};

use crate::backend::SettingsBackend;
use crate::error::{ClientError, ClientResult};

/// Current [`WorkspaceConfig`], kept in step with the settings backend.
///
/// Changes only through [`WorkspaceContext::save`]; every save is followed
/// by a reload so the held config is what the backend actually stored.
pub struct WorkspaceContext {
    backend: Arc<dyn SettingsBackend>,
    config: WorkspaceConfig,
}

impl WorkspaceContext {
    /// Load settings from `backend`.
    pub async fn load(backend: Arc<dyn SettingsBackend>) -> ClientResult<Self> {
        let config = backend.load_settings().await?;
        info!(workspace = %config.directory(), "Loaded workspace settings");
        Ok(Self { backend, config })
    }

    /// Load settings, falling back to an unset workspace on failure.
    pub async fn load_or_default(backend: Arc<dyn SettingsBackend>) -> Self {
        match backend.load_settings().await {
            Ok(config) => Self { backend, config },
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Self {
                    backend,
                    config: WorkspaceConfig::default(),
                }
            }
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Re-read settings from the backend.
    pub async fn reload(&mut self) -> ClientResult<&WorkspaceConfig> {
        self.config = self.backend.load_settings().await?;
        Ok(&self.config)
    }

    /// Persist `config` and reload. An empty directory is rejected.
    pub async fn save(&mut self, config: WorkspaceConfig) -> ClientResult<&WorkspaceConfig> {
        if config.is_unset() {
            return Err(ClientError::validation("Workspace path is required"));
        }
        self.backend.save_settings(&config).await?;
        info!(workspace = %config.directory(), "Saved workspace settings");
        self.reload().await
    }
}
