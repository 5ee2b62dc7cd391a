//! Settings persistence and local media file access.
//!
//! This crate provides:
//! - JSON settings store with platform default locations
//! - Inline `data:` URI encoding with a size ceiling
//! - Existence-checked canonical paths and asset descriptions
//! - Handing files to the platform's default application

pub mod error;
pub mod media_file;
pub mod opener;
pub mod settings;

pub use error::{StorageError, StorageResult};
pub use media_file::{
    canonical_path, describe_asset, mime_type_for, read_as_data_uri, DEFAULT_INLINE_CEILING_BYTES,
};
pub use opener::open_externally;
pub use settings::{default_workspace_dir, SettingsStore, SETTINGS_FILE_NAME};
