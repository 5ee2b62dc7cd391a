//! Backend seams.
//!
//! The controller, the workspace context and the resource loader each
//! depend on the narrowest trait they need. [`crate::LocalBackend`]
//! implements all three.

use async_trait::async_trait;
use ripley_models::{OperationId, OperationKind, OperationRequest, PreviewKind, WorkspaceConfig};

use crate::error::BackendResult;

/// Long-running media operations.
///
/// Each call receives the operation's ID so progress notifications it
/// publishes can be correlated.
#[async_trait]
pub trait OperationBackend: Send + Sync {
    /// Convert `input_path` to `format`. Returns the final output path.
    async fn convert(
        &self,
        id: &OperationId,
        input_path: &str,
        output_path: &str,
        format: &str,
    ) -> BackendResult<String>;

    /// Extract a preview. Returns the final preview path.
    async fn generate_preview(
        &self,
        id: &OperationId,
        input_path: &str,
        output_path: &str,
        kind: PreviewKind,
        timestamp_seconds: f64,
    ) -> BackendResult<String>;

    /// Denoise the audio track. Returns the final output path.
    async fn denoise(&self, id: &OperationId, input_path: &str, output_path: &str) -> BackendResult<String>;

    /// Best-effort request to stop whatever is running.
    async fn cancel_active_operation(&self) -> BackendResult<()>;
}

/// Persistent workspace settings.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn load_settings(&self) -> BackendResult<WorkspaceConfig>;

    async fn save_settings(&self, config: &WorkspaceConfig) -> BackendResult<()>;
}

/// Access to produced media for display.
#[async_trait]
pub trait MediaAccess: Send + Sync {
    /// Whole file as a `data:` URI; fails with `TooLarge` above the ceiling.
    async fn read_media_as_data_uri(&self, path: &str) -> BackendResult<String>;

    /// Existence-checked path suitable for building a reference.
    async fn resolve_canonical_path(&self, path: &str) -> BackendResult<String>;

    /// Hand the file to the platform's default application.
    async fn open_externally(&self, path: &str) -> BackendResult<()>;
}

/// Dispatch a request to the matching backend call.
pub async fn execute(backend: &dyn OperationBackend, request: &OperationRequest) -> BackendResult<String> {
    match &request.kind {
        OperationKind::Convert { format } => {
            backend
                .convert(&request.id, &request.input_path, &request.target_path, format)
                .await
        }
        OperationKind::Preview {
            preview_kind,
            timestamp_seconds,
        } => {
            backend
                .generate_preview(
                    &request.id,
                    &request.input_path,
                    &request.target_path,
                    *preview_kind,
                    *timestamp_seconds,
                )
                .await
        }
        OperationKind::Denoise => {
            backend
                .denoise(&request.id, &request.input_path, &request.target_path)
                .await
        }
    }
}
