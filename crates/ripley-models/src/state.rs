//! Per-session operation state.
//!
//! Exactly one [`OperationState`] exists per session. The mutators here keep
//! its invariants: progress stays in `[0, 100]`, never moves backwards while
//! running, starts at 0 on submission and is forced to 100 on completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of the session's operation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// Remote operation submitted and not yet resolved
    Running,
    /// Remote operation succeeded
    Completed,
    /// Remote operation failed
    Failed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Idle => "idle",
            OperationStatus::Running => "running",
            OperationStatus::Completed => "completed",
            OperationStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Completed | OperationStatus::Failed)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable state of the operation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationState {
    pub status: OperationStatus,
    /// Progress percentage (0-100)
    pub progress_percent: f64,
    pub error_message: Option<String>,
    /// Path produced by the last successful operation
    pub result_path: Option<String>,
    /// When the state last changed
    pub updated_at: DateTime<Utc>,
}

impl Default for OperationState {
    fn default() -> Self {
        Self {
            status: OperationStatus::Idle,
            progress_percent: 0.0,
            error_message: None,
            result_path: None,
            updated_at: Utc::now(),
        }
    }
}

impl OperationState {
    pub fn is_running(&self) -> bool {
        self.status == OperationStatus::Running
    }

    /// Enter `Running` for a fresh submission.
    pub fn begin(&mut self) {
        self.status = OperationStatus::Running;
        self.progress_percent = 0.0;
        self.error_message = None;
        self.result_path = None;
        self.updated_at = Utc::now();
    }

    /// Apply a progress value. Returns whether the state changed.
    ///
    /// Ignored unless running. Non-finite values are dropped, others are
    /// clamped to `[0, 100]` and only applied when they move forward.
    pub fn set_progress(&mut self, value: f64) -> bool {
        if !self.is_running() || !value.is_finite() {
            return false;
        }
        let value = value.clamp(0.0, 100.0);
        if value <= self.progress_percent {
            return false;
        }
        self.progress_percent = value;
        self.updated_at = Utc::now();
        true
    }

    /// Mark the operation as completed with its result path.
    pub fn complete(&mut self, result_path: impl Into<String>) {
        self.status = OperationStatus::Completed;
        self.progress_percent = 100.0;
        self.result_path = Some(result_path.into());
        self.updated_at = Utc::now();
    }

    /// Mark the operation as failed with a user-visible message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::Failed;
        self.progress_percent = 0.0;
        self.error_message = Some(message.into());
        self.updated_at = Utc::now();
    }

    /// Return to `Idle`, keeping the last result path.
    pub fn reset(&mut self) {
        self.status = OperationStatus::Idle;
        self.progress_percent = 0.0;
        self.error_message = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut state = OperationState::default();
        assert_eq!(state.status, OperationStatus::Idle);

        state.begin();
        assert!(state.is_running());
        assert!(!state.status.is_terminal());

        assert!(state.set_progress(40.0));
        assert_eq!(state.progress_percent, 40.0);

        state.complete("/out/a.mp4");
        assert_eq!(state.status, OperationStatus::Completed);
        assert_eq!(state.progress_percent, 100.0);
        assert!(state.status.is_terminal());

        state.reset();
        assert_eq!(state.status, OperationStatus::Idle);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(state.result_path.as_deref(), Some("/out/a.mp4"));
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut state = OperationState::default();
        state.begin();

        assert!(!state.set_progress(-5.0));
        assert_eq!(state.progress_percent, 0.0);

        assert!(state.set_progress(150.0));
        assert_eq!(state.progress_percent, 100.0);
    }

    #[test]
    fn test_progress_never_moves_backwards() {
        let mut state = OperationState::default();
        state.begin();
        state.set_progress(60.0);

        assert!(!state.set_progress(30.0));
        assert_eq!(state.progress_percent, 60.0);
    }

    #[test]
    fn test_progress_ignored_unless_running() {
        let mut state = OperationState::default();
        assert!(!state.set_progress(50.0));
        assert_eq!(state.progress_percent, 0.0);

        state.begin();
        assert!(!state.set_progress(f64::NAN));
        assert!(!state.set_progress(f64::INFINITY));
        assert_eq!(state.progress_percent, 0.0);
    }

    #[test]
    fn test_begin_clears_previous_outcome() {
        let mut state = OperationState::default();
        state.begin();
        state.fail("Error converting video: boom");
        assert_eq!(state.status, OperationStatus::Failed);

        state.begin();
        assert_eq!(state.error_message, None);
        assert_eq!(state.result_path, None);
        assert_eq!(state.progress_percent, 0.0);
    }
}
