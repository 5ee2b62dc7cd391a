//! Per-window session state tying selection, workspace and operations together.

use ripley_models::{MediaAsset, OperationKind, PreviewKind, WorkspaceConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::controller::{OperationController, OperationHandle, OperationOutcome};
use crate::error::{ClientError, ClientResult};
use crate::workspace::WorkspaceContext;

/// Latest result path per operation family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSlots {
    pub output: Option<String>,
    pub preview: Option<String>,
    pub denoised: Option<String>,
}

impl ResultSlots {
    fn slot_mut(&mut self, kind: &OperationKind) -> &mut Option<String> {
        match kind {
            OperationKind::Convert { .. } => &mut self.output,
            OperationKind::Preview { .. } => &mut self.preview,
            OperationKind::Denoise => &mut self.denoised,
        }
    }

    pub fn get(&self, kind: &OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Convert { .. } => self.output.as_deref(),
            OperationKind::Preview { .. } => self.preview.as_deref(),
            OperationKind::Denoise => self.denoised.as_deref(),
        }
    }

    pub fn record(&mut self, kind: &OperationKind, path: impl Into<String>) {
        *self.slot_mut(kind) = Some(path.into());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What one UI window holds between user actions.
pub struct Session {
    controller: OperationController,
    workspace: WorkspaceContext,
    asset: Option<MediaAsset>,
    format: String,
    preview_kind: PreviewKind,
    preview_timestamp_secs: f64,
    results: ResultSlots,
}

impl Session {
    pub fn new(controller: OperationController, workspace: WorkspaceContext, config: &ClientConfig) -> Self {
        Self {
            controller,
            workspace,
            asset: None,
            format: "mp4".to_string(),
            preview_kind: PreviewKind::default(),
            preview_timestamp_secs: config.preview_timestamp_secs,
            results: ResultSlots::default(),
        }
    }

    pub fn controller(&self) -> &OperationController {
        &self.controller
    }

    pub fn workspace(&self) -> &WorkspaceConfig {
        self.workspace.config()
    }

    pub fn workspace_context_mut(&mut self) -> &mut WorkspaceContext {
        &mut self.workspace
    }

    pub fn asset(&self) -> Option<&MediaAsset> {
        self.asset.as_ref()
    }

    pub fn results(&self) -> &ResultSlots {
        &self.results
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn preview_kind(&self) -> PreviewKind {
        self.preview_kind
    }

    /// Replace the selection. Earlier results no longer apply.
    pub fn select_asset(&mut self, asset: MediaAsset) {
        debug!(path = %asset.path, "Selected asset");
        self.asset = Some(asset);
        self.forget_results();
    }

    pub fn clear_asset(&mut self) {
        self.asset = None;
        self.forget_results();
    }

    fn forget_results(&mut self) {
        // A running operation keeps its state until it resolves
        if !self.controller.state().is_running() {
            self.controller.reset();
        }
        self.results.clear();
    }

    /// Choose the conversion target format.
    pub fn set_format(&mut self, format: &str) -> ClientResult<()> {
        match OperationKind::convert(format) {
            Ok(OperationKind::Convert { format }) => {
                self.format = format;
                Ok(())
            }
            Ok(_) => Err(ClientError::validation(format!("Invalid format: {}", format))),
            Err(e) => Err(ClientError::validation(e.to_string())),
        }
    }

    pub fn set_preview_kind(&mut self, kind: PreviewKind) {
        if kind != self.preview_kind {
            self.preview_kind = kind;
            self.results.preview = None;
        }
    }

    pub fn set_preview_timestamp(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.preview_timestamp_secs = seconds.max(0.0);
        }
    }

    /// Convert operation for the chosen format.
    pub fn convert_operation(&self) -> ClientResult<OperationKind> {
        OperationKind::convert(&self.format).map_err(|e| ClientError::validation(e.to_string()))
    }

    /// Preview operation for the chosen kind and timestamp.
    pub fn preview_operation(&self) -> OperationKind {
        OperationKind::preview(self.preview_kind, self.preview_timestamp_secs)
    }

    /// Submit `kind` on the selected asset without waiting for it.
    pub fn submit(&self, kind: OperationKind) -> ClientResult<OperationHandle> {
        self.controller
            .submit(self.asset.as_ref(), kind, self.workspace.config())
    }

    /// Wait for `handle` and record a successful result.
    pub async fn finish(&mut self, handle: OperationHandle) -> OperationOutcome {
        let kind = handle.request().kind.clone();
        let outcome = handle.wait().await;
        if let Some(path) = outcome.result_path() {
            self.results.record(&kind, path);
        }
        outcome
    }

    async fn run(&mut self, kind: OperationKind) -> ClientResult<OperationOutcome> {
        let handle = self.submit(kind)?;
        Ok(self.finish(handle).await)
    }

    /// Convert the selected asset to the chosen format.
    pub async fn convert(&mut self) -> ClientResult<OperationOutcome> {
        let kind = self.convert_operation()?;
        self.run(kind).await
    }

    /// Generate a preview of the chosen kind.
    pub async fn preview(&mut self) -> ClientResult<OperationOutcome> {
        let kind = self.preview_operation();
        self.run(kind).await
    }

    /// Denoise the selected asset's audio.
    pub async fn denoise(&mut self) -> ClientResult<OperationOutcome> {
        self.run(OperationKind::Denoise).await
    }

    pub fn cancel(&self) -> bool {
        self.controller.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_slots() {
        let mut slots = ResultSlots::default();
        slots.record(&OperationKind::Denoise, "/a_denoised.mp4");
        slots.record(&OperationKind::preview(PreviewKind::Clip, 1.0), "/a_preview.mp4");

        assert_eq!(slots.get(&OperationKind::Denoise), Some("/a_denoised.mp4"));
        assert_eq!(slots.output, None);

        slots.clear();
        assert_eq!(slots, ResultSlots::default());
    }
}
