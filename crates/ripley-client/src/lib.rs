//! Client-side core for long-running media operations.
//!
//! This crate provides:
//! - Deterministic output and preview path derivation
//! - The operation controller state machine with correlated progress
//! - Backend seams plus a local FFmpeg/deep-filter backend
//! - A resilient fallback chain for rendering results
//! - Workspace and session context for UI collaborators

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod local;
pub mod logging;
pub mod paths;
pub mod session;
pub mod workspace;

pub use backend::{MediaAccess, OperationBackend, SettingsBackend};
pub use config::ClientConfig;
pub use controller::{OperationController, OperationHandle, OperationOutcome};
pub use error::{BackendError, BackendResult, ClientError, ClientResult};
pub use loader::{
    CompatibilityCheck, DirectReference, FileUrlBuilder, InlineData, LoadStrategy, MediaResourceLoader,
    ReferenceBuilder, ResourceView, StrategyOutcome,
};
pub use local::LocalBackend;
pub use logging::OperationLogger;
pub use paths::{resolve_denoise_path, resolve_output_path, resolve_preview_path, resolve_target_path};
pub use session::{ResultSlots, Session};
pub use workspace::WorkspaceContext;
