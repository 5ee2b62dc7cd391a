//! Structured logging for one submitted operation.
//!
//! Every line carries the operation id and kind so a run can be followed
//! from submission to its terminal state.

use std::time::Instant;

use ripley_models::{OperationId, OperationKind, OperationRequest};
use tracing::{error, info, warn, Span};

/// Logger bound to a single [`OperationRequest`].
#[derive(Debug, Clone)]
pub struct OperationLogger {
    operation_id: OperationId,
    kind: OperationKind,
    target_path: String,
    started: Instant,
}

impl OperationLogger {
    pub fn new(request: &OperationRequest) -> Self {
        Self {
            operation_id: request.id.clone(),
            kind: request.kind.clone(),
            target_path: request.target_path.clone(),
            started: Instant::now(),
        }
    }

    /// Log submission with the input and the resolved target.
    pub fn log_start(&self, input_path: &str) {
        match &self.kind {
            OperationKind::Convert { format } => info!(
                operation_id = %self.operation_id,
                operation = self.kind.as_str(),
                format = %format,
                input = %input_path,
                target = %self.target_path,
                "Conversion submitted"
            ),
            OperationKind::Preview {
                preview_kind,
                timestamp_seconds,
            } => info!(
                operation_id = %self.operation_id,
                operation = self.kind.as_str(),
                preview_kind = preview_kind.as_str(),
                timestamp_seconds,
                input = %input_path,
                target = %self.target_path,
                "Preview submitted"
            ),
            OperationKind::Denoise => info!(
                operation_id = %self.operation_id,
                operation = self.kind.as_str(),
                input = %input_path,
                target = %self.target_path,
                "Denoise submitted"
            ),
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            operation_id = %self.operation_id,
            operation = self.kind.as_str(),
            "Operation warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            operation_id = %self.operation_id,
            operation = self.kind.as_str(),
            elapsed_ms = self.elapsed_ms(),
            "{}", message
        );
    }

    pub fn log_cancelled(&self) {
        info!(
            operation_id = %self.operation_id,
            operation = self.kind.as_str(),
            elapsed_ms = self.elapsed_ms(),
            "Operation cancelled"
        );
    }

    /// Log success. The backend may have written somewhere other than the
    /// resolved target; that is noted but not an error.
    pub fn log_completion(&self, result_path: &str) {
        if result_path != self.target_path {
            info!(
                operation_id = %self.operation_id,
                target = %self.target_path,
                result = %result_path,
                "Backend wrote to a different path than requested"
            );
        }
        info!(
            operation_id = %self.operation_id,
            operation = self.kind.as_str(),
            result = %result_path,
            elapsed_ms = self.elapsed_ms(),
            "Operation completed"
        );
    }

    pub fn operation_id(&self) -> &OperationId {
        &self.operation_id
    }

    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Span wrapping the backend call.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "operation",
            operation_id = %self.operation_id,
            operation = self.kind.as_str()
        )
    }
}
