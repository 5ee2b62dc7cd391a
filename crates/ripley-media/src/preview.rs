//! Preview extraction: a single thumbnail frame or a short clip.

use std::path::{Path, PathBuf};

use ripley_models::PreviewKind;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::fs_utils::{ensure_parent_dir, require_input};

/// Length of a clip preview in seconds.
pub const CLIP_PREVIEW_SECONDS: f64 = 5.0;

/// Format seconds as `HH:MM:SS.ss`.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:05.2}", hours, minutes, secs)
}

/// Build the FFmpeg command for a preview.
pub fn preview_command(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    kind: PreviewKind,
    timestamp_seconds: f64,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(input, output).seek(timestamp_seconds);
    match kind {
        PreviewKind::Thumbnail => cmd.single_frame().output_arg("-q:v").output_arg("2"),
        PreviewKind::Clip => cmd
            .duration(CLIP_PREVIEW_SECONDS)
            .video_codec("libx264")
            .audio_codec("aac"),
    }
}

/// Generate a preview of `input` at `timestamp_seconds`.
pub async fn generate_preview(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    kind: PreviewKind,
    timestamp_seconds: f64,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    require_input(input).await?;
    ensure_parent_dir(output).await?;

    info!(
        kind = %kind,
        timestamp = timestamp_seconds,
        "Generating preview {} -> {}",
        input.display(),
        output.display()
    );

    let cmd = preview_command(input, output, kind, timestamp_seconds);
    runner.run(&cmd).await?;

    Ok(output.to_path_buf())
}
