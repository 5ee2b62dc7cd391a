//! In-process backend running FFmpeg and deep-filter locally.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use ripley_media::{FfmpegRunner, MediaConfig, ProgressCallback};
use ripley_models::{OperationId, PreviewKind, WorkspaceConfig};
use ripley_progress::ProgressPublisher;
use ripley_storage::{SettingsStore, DEFAULT_INLINE_CEILING_BYTES};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::backend::{MediaAccess, OperationBackend, SettingsBackend};
use crate::error::BackendResult;

/// Cancellation handle for the process currently running.
struct ActiveProcess {
    id: OperationId,
    cancel_tx: watch::Sender<bool>,
}

/// Backend that executes operations as child processes of this one.
///
/// Only one operation is tracked for cancellation; starting another
/// replaces the handle.
pub struct LocalBackend {
    media: MediaConfig,
    settings: SettingsStore,
    progress: ProgressPublisher,
    inline_ceiling_bytes: u64,
    active: Mutex<Option<ActiveProcess>>,
}

impl LocalBackend {
    pub fn new(media: MediaConfig, settings: SettingsStore, progress: ProgressPublisher) -> Self {
        Self {
            media,
            settings,
            progress,
            inline_ceiling_bytes: DEFAULT_INLINE_CEILING_BYTES,
            active: Mutex::new(None),
        }
    }

    /// Override the largest file served inline.
    pub fn with_inline_ceiling(mut self, bytes: u64) -> Self {
        self.inline_ceiling_bytes = bytes;
        self
    }

    /// Whether a process is registered for cancellation.
    pub fn has_active_process(&self) -> bool {
        self.lock_active().is_some()
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveProcess>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `id` as the cancellable process and build its runner.
    fn start(&self, id: &OperationId) -> BackendResult<FfmpegRunner> {
        let ffmpeg = self.media.ffmpeg_path()?;
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let previous = self.lock_active().replace(ActiveProcess {
            id: id.clone(),
            cancel_tx,
        });
        if let Some(previous) = previous {
            debug!(operation_id = %previous.id, "Replacing cancellation handle");
        }

        Ok(FfmpegRunner::new()
            .with_binary(ffmpeg)
            .with_cancel(cancel_rx)
            .with_timeout(self.media.timeout_secs))
    }

    fn finish(&self, id: &OperationId) {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|process| &process.id == id) {
            *active = None;
        }
    }

    fn progress_callback(&self, id: &OperationId) -> ProgressCallback {
        let publisher = self.progress.clone();
        let id = id.clone();
        Arc::new(move |value: f64| publisher.progress(&id, value))
    }
}

fn path_string(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl OperationBackend for LocalBackend {
    async fn convert(
        &self,
        id: &OperationId,
        input_path: &str,
        output_path: &str,
        format: &str,
    ) -> BackendResult<String> {
        let runner = self.start(id)?;
        let result =
            ripley_media::convert_video(&runner, input_path, output_path, format, self.progress_callback(id)).await;
        self.finish(id);
        Ok(path_string(result?))
    }

    async fn generate_preview(
        &self,
        id: &OperationId,
        input_path: &str,
        output_path: &str,
        kind: PreviewKind,
        timestamp_seconds: f64,
    ) -> BackendResult<String> {
        let runner = self.start(id)?;
        let result =
            ripley_media::generate_preview(&runner, input_path, output_path, kind, timestamp_seconds).await;
        self.finish(id);
        Ok(path_string(result?))
    }

    async fn denoise(&self, id: &OperationId, input_path: &str, output_path: &str) -> BackendResult<String> {
        let runner = self.start(id)?;
        let result =
            ripley_media::denoise_video(&self.media, &runner, input_path, output_path, self.progress_callback(id))
                .await;
        self.finish(id);
        Ok(path_string(result?))
    }

    async fn cancel_active_operation(&self) -> BackendResult<()> {
        let active = self.lock_active().take();
        match active {
            Some(process) => {
                info!(operation_id = %process.id, "Cancelling active process");
                // The runner may already have exited; nothing to signal then.
                let _ = process.cancel_tx.send(true);
            }
            None => debug!("No active process to cancel"),
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsBackend for LocalBackend {
    async fn load_settings(&self) -> BackendResult<WorkspaceConfig> {
        Ok(self.settings.load().await?)
    }

    async fn save_settings(&self, config: &WorkspaceConfig) -> BackendResult<()> {
        Ok(self.settings.save(config).await?)
    }
}

#[async_trait]
impl MediaAccess for LocalBackend {
    async fn read_media_as_data_uri(&self, path: &str) -> BackendResult<String> {
        Ok(ripley_storage::read_as_data_uri(path, self.inline_ceiling_bytes).await?)
    }

    async fn resolve_canonical_path(&self, path: &str) -> BackendResult<String> {
        Ok(ripley_storage::canonical_path(path).await?)
    }

    async fn open_externally(&self, path: &str) -> BackendResult<()> {
        Ok(ripley_storage::open_externally(path).await?)
    }
}
