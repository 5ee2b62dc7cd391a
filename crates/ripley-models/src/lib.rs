//! Shared data models for the RipleyFlow media client.
//!
//! This crate provides Serde-serializable types for:
//! - Selected media assets and the workspace configuration
//! - Operation identifiers, kinds and requests
//! - The single per-session operation state
//! - Resource load outcomes and their failure taxonomy

pub mod asset;
pub mod error;
pub mod load;
pub mod operation;
pub mod state;
pub mod workspace;

// Re-export common types
pub use asset::{MediaAsset, SELECTABLE_EXTENSIONS};
pub use error::{ModelError, ModelResult};
pub use load::{LoadFailureReason, LoadOutcome, LoadResult, RenderError, ResourceSource};
pub use operation::{OperationId, OperationKind, OperationRequest, PreviewKind};
pub use state::{OperationState, OperationStatus};
pub use workspace::WorkspaceConfig;
