//! FFmpeg and deep-filter wrappers for local media operations.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2` and the input banner
//! - Cancellation support via tokio watch channels
//! - Format conversion, preview extraction and audio denoising

pub mod command;
pub mod config;
pub mod convert;
pub mod denoise;
pub mod error;
pub mod fs_utils;
pub mod preview;
pub mod progress;

pub use command::{DeepFilterCommand, FfmpegCommand, FfmpegRunner};
pub use config::MediaConfig;
pub use convert::{convert_video, format_args};
pub use denoise::{denoise_video, StageProgress};
pub use error::{MediaError, MediaResult};
pub use preview::{format_timestamp, generate_preview, CLIP_PREVIEW_SECONDS};
pub use progress::{FfmpegProgress, ProgressCallback, ProgressThrottle};
