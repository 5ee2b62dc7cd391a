//! Operation lifecycle state machine.
//!
//! ```text
//! Idle ──submit──▶ Running ──ok──▶ Completed ──grace──▶ Idle
//!                     │    └─err──▶ Failed
//!                     └──cancel──▶ Idle
//! ```
//!
//! The controller is the only writer of [`OperationState`]. Observers get a
//! `watch` receiver. Every submission gets a fresh [`OperationId`];
//! progress events and backend results carrying any other ID are dropped,
//! which keeps a cancelled or finished operation from touching the state of
//! the next one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ripley_models::{MediaAsset, OperationId, OperationKind, OperationRequest, OperationState, OperationStatus, WorkspaceConfig};
use ripley_progress::{ProgressChannel, ProgressEvent, ProgressRelay, ProgressSink};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::backend::{self, OperationBackend};
use crate::config::ClientConfig;
use crate::error::{BackendError, ClientError, ClientResult};
use crate::logging::OperationLogger;
use crate::paths;

/// How a submitted operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Completed { result_path: String },
    Failed { message: String },
    /// Cancelled locally or reported as cancelled by the backend
    Cancelled,
    /// Finished after the controller had already moved on
    Superseded,
}

impl OperationOutcome {
    pub fn result_path(&self) -> Option<&str> {
        match self {
            OperationOutcome::Completed { result_path } => Some(result_path),
            _ => None,
        }
    }
}

/// A submitted operation.
pub struct OperationHandle {
    request: OperationRequest,
    task: JoinHandle<OperationOutcome>,
}

impl OperationHandle {
    pub fn id(&self) -> &OperationId {
        &self.request.id
    }

    pub fn request(&self) -> &OperationRequest {
        &self.request
    }

    /// Wait for the terminal transition.
    pub async fn wait(self) -> OperationOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => OperationOutcome::Failed {
                message: format!("Operation task failed: {}", e),
            },
        }
    }
}

/// User-visible prefix for failures of `kind`.
pub fn failure_prefix(kind: &OperationKind) -> &'static str {
    match kind {
        OperationKind::Convert { .. } => "Error converting video",
        OperationKind::Preview { .. } => "Error generating preview",
        OperationKind::Denoise => "Error denoising video",
    }
}

struct ControllerInner {
    backend: Arc<dyn OperationBackend>,
    completion_grace: Duration,
    state_tx: watch::Sender<OperationState>,
    /// ID of the operation allowed to mutate the state. Held while mutating.
    active: Mutex<Option<OperationId>>,
}

impl ControllerInner {
    fn lock_active(&self) -> MutexGuard<'_, Option<OperationId>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_active(active: &Option<OperationId>, id: &OperationId) -> bool {
        active.as_ref() == Some(id)
    }

    async fn run(self: Arc<Self>, request: OperationRequest, logger: OperationLogger) -> OperationOutcome {
        let result = backend::execute(self.backend.as_ref(), &request).await;
        match result {
            Ok(path) => self.complete(&request.id, path, &logger),
            Err(err) => self.fail(&request, err, &logger),
        }
    }

    fn complete(self: &Arc<Self>, id: &OperationId, result_path: String, logger: &OperationLogger) -> OperationOutcome {
        {
            let active = self.lock_active();
            if !Self::is_active(&active, id) || !self.state_tx.borrow().is_running() {
                logger.log_warning("result arrived after the operation was cancelled");
                return OperationOutcome::Superseded;
            }
            self.state_tx.send_modify(|state| state.complete(result_path.clone()));
        }
        logger.log_completion(&result_path);

        let inner = Arc::clone(self);
        let id = id.clone();
        tokio::spawn(async move {
            if !inner.completion_grace.is_zero() {
                tokio::time::sleep(inner.completion_grace).await;
            }
            inner.settle_completed(&id);
        });

        OperationOutcome::Completed { result_path }
    }

    /// Return a completed operation to `Idle` unless something replaced it.
    fn settle_completed(&self, id: &OperationId) {
        let mut active = self.lock_active();
        if Self::is_active(&active, id) && self.state_tx.borrow().status == OperationStatus::Completed {
            *active = None;
            self.state_tx.send_modify(|state| state.reset());
        }
    }

    /// Record a terminal failure.
    ///
    /// Unlike completion there is no grace timer: `Failed` keeps its message
    /// until the user acts, either by submitting again or by calling
    /// [`OperationController::reset`]. Cancellation messages skip `Failed`
    /// and go straight back to `Idle`.
    fn fail(&self, request: &OperationRequest, err: BackendError, logger: &OperationLogger) -> OperationOutcome {
        let mut active = self.lock_active();
        if !Self::is_active(&active, &request.id) {
            debug!(operation_id = %request.id, "Ignoring failure of superseded operation: {}", err);
            return OperationOutcome::Superseded;
        }
        *active = None;

        if err.is_cancellation() {
            logger.log_cancelled();
            self.state_tx.send_modify(|state| state.reset());
            return OperationOutcome::Cancelled;
        }

        let message = format!("{}: {}", failure_prefix(&request.kind), err);
        logger.log_error(&message);
        self.state_tx.send_modify(|state| state.fail(message.clone()));
        OperationOutcome::Failed { message }
    }
}

impl ProgressSink for ControllerInner {
    fn deliver(&self, event: &ProgressEvent) {
        let active = self.lock_active();
        if !Self::is_active(&active, &event.operation_id) {
            debug!(operation_id = %event.operation_id, "Dropping stale progress event");
            return;
        }
        self.state_tx.send_if_modified(|state| state.set_progress(event.value));
    }
}

/// Orchestrates one remote operation at a time.
#[derive(Clone)]
pub struct OperationController {
    inner: Arc<ControllerInner>,
    relay: Arc<ProgressRelay>,
}

impl OperationController {
    /// Create a controller and attach it to the progress stream.
    ///
    /// Must be called inside a tokio runtime; the progress relay is spawned
    /// here and lives as long as the controller.
    pub fn new(backend: Arc<dyn OperationBackend>, progress: &ProgressChannel, config: &ClientConfig) -> Self {
        let (state_tx, _) = watch::channel(OperationState::default());
        let inner = Arc::new(ControllerInner {
            backend,
            completion_grace: config.completion_grace,
            state_tx,
            active: Mutex::new(None),
        });

        let relay = ProgressRelay::spawn(progress.subscribe());
        debug!(stream = progress.name(), "Progress relay attached");
        relay.register(inner.clone());

        Self {
            inner,
            relay: Arc::new(relay),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> OperationState {
        self.inner.state_tx.borrow().clone()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.inner.state_tx.subscribe()
    }

    /// ID of the operation currently owning the state, if any.
    pub fn active_operation(&self) -> Option<OperationId> {
        self.inner.lock_active().clone()
    }

    /// Whether the progress relay is still attached.
    pub fn is_listening(&self) -> bool {
        self.relay.is_alive()
    }

    /// Submit an operation on `asset`.
    ///
    /// Fails with a validation error when no asset is selected and with
    /// [`ClientError::AlreadyRunning`] while another operation runs. Neither
    /// failure changes the state.
    pub fn submit(
        &self,
        asset: Option<&MediaAsset>,
        kind: OperationKind,
        workspace: &WorkspaceConfig,
    ) -> ClientResult<OperationHandle> {
        let asset = asset.ok_or_else(|| ClientError::validation("Please select a video first"))?;
        let target = paths::resolve_target_path(&asset.path, &kind, workspace.directory());
        let request = OperationRequest::new(asset.path.clone(), target, kind);

        {
            let mut active = self.inner.lock_active();
            if self.inner.state_tx.borrow().is_running() {
                return Err(ClientError::AlreadyRunning);
            }
            *active = Some(request.id.clone());
            self.inner.state_tx.send_modify(|state| state.begin());
        }

        let logger = OperationLogger::new(&request);
        logger.log_start(&request.input_path);

        let span = logger.create_span();
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(inner.run(request.clone(), logger).instrument(span));

        Ok(OperationHandle { request, task })
    }

    /// Cancel the running operation.
    ///
    /// The state returns to `Idle` immediately. The backend is signalled in
    /// the background and its failure only logged. Returns `false` when
    /// nothing was running.
    pub fn cancel(&self) -> bool {
        let cancelled = {
            let mut active = self.inner.lock_active();
            if !self.inner.state_tx.borrow().is_running() {
                None
            } else {
                self.inner.state_tx.send_modify(|state| state.reset());
                active.take()
            }
        };

        let Some(id) = cancelled else {
            return false;
        };
        info!(operation_id = %id, "Cancellation requested");

        let backend = Arc::clone(&self.inner.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.cancel_active_operation().await {
                warn!(operation_id = %id, "Failed to signal cancellation: {}", e);
            }
        });
        true
    }

    /// Clear a terminal state back to `Idle`. No effect while running.
    pub fn reset(&self) -> bool {
        let mut active = self.inner.lock_active();
        if self.inner.state_tx.borrow().is_running() {
            return false;
        }
        *active = None;
        self.inner.state_tx.send_modify(|state| {
            state.reset();
            state.result_path = None;
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendResult;
    use async_trait::async_trait;
    use ripley_models::PreviewKind;
    use ripley_progress::ProgressPublisher;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    struct ScriptedBackend {
        outcomes: tokio::sync::Mutex<mpsc::UnboundedReceiver<BackendResult<String>>>,
        cancel_calls: AtomicUsize,
        fail_cancel: bool,
    }

    impl ScriptedBackend {
        async fn next(&self) -> BackendResult<String> {
            self.outcomes
                .lock()
                .await
                .recv()
                .await
                .unwrap_or_else(|| Err(BackendError::remote("script exhausted")))
        }
    }

    #[async_trait]
    impl OperationBackend for ScriptedBackend {
        async fn convert(&self, _: &OperationId, _: &str, _: &str, _: &str) -> BackendResult<String> {
            self.next().await
        }

        async fn generate_preview(
            &self,
            _: &OperationId,
            _: &str,
            _: &str,
            _: PreviewKind,
            _: f64,
        ) -> BackendResult<String> {
            self.next().await
        }

        async fn denoise(&self, _: &OperationId, _: &str, _: &str) -> BackendResult<String> {
            self.next().await
        }

        async fn cancel_active_operation(&self) -> BackendResult<()> {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_cancel {
                Err(BackendError::remote("no process to cancel"))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        controller: OperationController,
        backend: Arc<ScriptedBackend>,
        script: mpsc::UnboundedSender<BackendResult<String>>,
        progress: ProgressPublisher,
        _channel: ProgressChannel,
    }

    fn harness_with(grace: Duration, fail_cancel: bool) -> Harness {
        let (script, rx) = mpsc::unbounded_channel();
        let backend = Arc::new(ScriptedBackend {
            outcomes: tokio::sync::Mutex::new(rx),
            cancel_calls: AtomicUsize::new(0),
            fail_cancel,
        });
        let channel = ProgressChannel::default();
        let config = ClientConfig::default().with_completion_grace(grace);
        let controller = OperationController::new(backend.clone(), &channel, &config);
        Harness {
            controller,
            backend,
            script,
            progress: channel.publisher(),
            _channel: channel,
        }
    }

    fn harness() -> Harness {
        harness_with(Duration::ZERO, false)
    }

    fn asset() -> MediaAsset {
        MediaAsset::new("/videos/clip.mov", "clip.mov", 1024)
    }

    fn convert() -> OperationKind {
        OperationKind::convert("mp4").unwrap()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn test_submit_without_asset_is_rejected() {
        let h = harness();
        let err = h
            .controller
            .submit(None, convert(), &WorkspaceConfig::default())
            .err()
            .unwrap();

        assert_eq!(err, ClientError::Validation("Please select a video first".to_string()));
        assert_eq!(h.controller.state().status, OperationStatus::Idle);
    }

    #[tokio::test]
    async fn test_submit_enters_running_and_targets_workspace() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::new("/out"))
            .unwrap();

        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Running);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(state.error_message, None);
        assert_eq!(state.result_path, None);
        assert_eq!(handle.request().target_path, "/out/clip.mp4");
        assert_eq!(h.controller.active_operation().as_ref(), Some(handle.id()));
    }

    #[tokio::test]
    async fn test_submit_while_running_is_rejected() {
        let h = harness();
        let _handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        let before = h.controller.state();

        let err = h
            .controller
            .submit(Some(&asset()), OperationKind::Denoise, &WorkspaceConfig::default())
            .err()
            .unwrap();

        assert_eq!(err, ClientError::AlreadyRunning);
        assert_eq!(h.controller.state(), before);
    }

    #[tokio::test]
    async fn test_progress_is_applied_and_clamped() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();

        h.progress.progress(handle.id(), -5.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 0.0);

        h.progress.progress(handle.id(), 42.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 42.0);

        h.progress.progress(handle.id(), 150.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_progress_for_other_operation_is_ignored() {
        let h = harness();
        let _handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();

        h.progress.progress(&OperationId::new(), 90.0);
        settle().await;

        assert_eq!(h.controller.state().progress_percent, 0.0);
    }

    #[tokio::test]
    async fn test_success_completes_then_returns_to_idle() {
        let h = harness_with(Duration::from_millis(80), false);
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        h.script.send(Ok("/videos/clip.mp4".to_string())).unwrap();

        let outcome = handle.wait().await;
        assert_eq!(outcome.result_path(), Some("/videos/clip.mp4"));

        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Completed);
        assert_eq!(state.progress_percent, 100.0);
        assert_eq!(state.result_path.as_deref(), Some("/videos/clip.mp4"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(h.controller.active_operation(), None);
    }

    #[tokio::test]
    async fn test_progress_after_completion_is_ignored() {
        let h = harness_with(Duration::from_millis(200), false);
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        let id = handle.id().clone();
        h.script.send(Ok("/videos/clip.mp4".to_string())).unwrap();
        handle.wait().await;

        h.progress.progress(&id, 10.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_failure_is_prefixed() {
        let h = harness();
        let handle = h
            .controller
            .submit(
                Some(&asset()),
                OperationKind::preview(PreviewKind::Thumbnail, 1.0),
                &WorkspaceConfig::default(),
            )
            .unwrap();
        h.progress.progress(handle.id(), 30.0);
        settle().await;
        h.script.send(Err(BackendError::remote("FFmpeg command failed: exited with 1"))).unwrap();

        let outcome = handle.wait().await;
        let expected = "Error generating preview: FFmpeg command failed: exited with 1".to_string();
        assert_eq!(outcome, OperationOutcome::Failed { message: expected.clone() });

        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Failed);
        assert_eq!(state.error_message, Some(expected));
        assert_eq!(state.progress_percent, 0.0);
    }

    #[tokio::test]
    async fn test_cancellation_failure_is_silent() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), OperationKind::Denoise, &WorkspaceConfig::default())
            .unwrap();
        h.script
            .send(Err(BackendError::remote("Failed to extract audio: Operation cancelled by user")))
            .unwrap();

        assert_eq!(handle.wait().await, OperationOutcome::Cancelled);
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn test_cancel_resets_and_signals_backend() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        h.progress.progress(handle.id(), 55.0);
        settle().await;

        assert!(h.controller.cancel());
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(state.error_message, None);

        settle().await;
        assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_succeeds_when_backend_signal_fails() {
        let h = harness_with(Duration::ZERO, true);
        let _handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();

        assert!(h.controller.cancel());
        settle().await;

        assert_eq!(h.controller.state().status, OperationStatus::Idle);
        assert_eq!(h.controller.state().error_message, None);
        assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let h = harness();
        assert!(!h.controller.cancel());
        settle().await;
        assert_eq!(h.backend.cancel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_late_result_after_cancel_is_ignored() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        let id = handle.id().clone();
        h.controller.cancel();

        h.progress.progress(&id, 80.0);
        h.script.send(Ok("/videos/clip.mp4".to_string())).unwrap();

        assert_eq!(handle.wait().await, OperationOutcome::Superseded);
        settle().await;
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(state.result_path, None);
    }

    #[tokio::test]
    async fn test_resubmission_ignores_previous_progress() {
        let h = harness_with(Duration::from_millis(500), false);
        let first = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        let first_id = first.id().clone();
        h.script.send(Ok("/videos/clip.mp4".to_string())).unwrap();
        first.wait().await;

        // Submitting from Completed is allowed and resets progress at once
        let second = h
            .controller
            .submit(Some(&asset()), OperationKind::Denoise, &WorkspaceConfig::default())
            .unwrap();
        assert_eq!(h.controller.state().progress_percent, 0.0);

        h.progress.progress(&first_id, 95.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 0.0);
        assert_eq!(h.controller.state().status, OperationStatus::Running);

        h.progress.progress(second.id(), 12.0);
        settle().await;
        assert_eq!(h.controller.state().progress_percent, 12.0);
    }

    #[tokio::test]
    async fn test_failure_persists_past_grace_until_resubmitted() {
        let h = harness_with(Duration::from_millis(20), false);
        let handle = h
            .controller
            .submit(Some(&asset()), OperationKind::Denoise, &WorkspaceConfig::default())
            .unwrap();
        h.script.send(Err(BackendError::remote("deep-filter exited with 2"))).unwrap();
        handle.wait().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Failed);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Error denoising video: deep-filter exited with 2")
        );

        let retry = h
            .controller
            .submit(Some(&asset()), OperationKind::Denoise, &WorkspaceConfig::default())
            .unwrap();
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Running);
        assert_eq!(state.error_message, None);
        assert_eq!(h.controller.active_operation().as_ref(), Some(retry.id()));
    }

    #[tokio::test]
    async fn test_reset_clears_failure() {
        let h = harness();
        let handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();
        h.script.send(Err(BackendError::remote("boom"))).unwrap();
        handle.wait().await;
        assert_eq!(h.controller.state().status, OperationStatus::Failed);

        assert!(h.controller.reset());
        let state = h.controller.state();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn test_state_changes_are_observable() {
        let h = harness();
        let mut rx = h.controller.subscribe();
        let _handle = h
            .controller
            .submit(Some(&asset()), convert(), &WorkspaceConfig::default())
            .unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, OperationStatus::Running);
        assert!(h.controller.is_listening());
    }
}
