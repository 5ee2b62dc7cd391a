//! Container format conversion.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::fs_utils::{ensure_parent_dir, require_input};
use crate::progress::{ProgressCallback, ProgressThrottle};

/// Encoder arguments for a target format.
///
/// Unknown formats fall back to H.264/AAC and let FFmpeg pick the muxer from
/// the output extension.
pub fn format_args(format: &str) -> Vec<&'static str> {
    match format.to_ascii_lowercase().as_str() {
        "mp4" => vec![
            "-c:v", "libx264", "-c:a", "aac", "-preset", "medium", "-crf", "23", "-movflags", "+faststart",
            "-pix_fmt", "yuv420p", "-profile:v", "high", "-level", "4.0",
        ],
        "avi" => vec!["-c:v", "libx264", "-c:a", "libmp3lame", "-preset", "medium", "-crf", "23"],
        "webm" => vec![
            "-c:v", "libvpx-vp9", "-crf", "30", "-b:v", "0", "-c:a", "libopus", "-b:a", "128k", "-pix_fmt",
            "yuv420p",
        ],
        // mov, mkv and anything else
        _ => vec!["-c:v", "libx264", "-c:a", "aac", "-preset", "medium", "-crf", "23"],
    }
}

/// Convert `input` into `format`, writing to `output`.
///
/// `on_progress` receives percentages of this conversion.
pub async fn convert_video(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: &str,
    on_progress: ProgressCallback,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    require_input(input).await?;
    ensure_parent_dir(output).await?;

    info!(format, "Converting {} -> {}", input.display(), output.display());

    let cmd = FfmpegCommand::new(input, output).output_args(format_args(format));
    run_tracked(runner, &cmd, on_progress).await?;

    Ok(output.to_path_buf())
}

/// Run `cmd`, forwarding throttled percentages to `on_progress`.
pub(crate) async fn run_tracked(
    runner: &FfmpegRunner,
    cmd: &FfmpegCommand,
    on_progress: ProgressCallback,
) -> MediaResult<()> {
    // Immediate feedback before FFmpeg prints its banner
    on_progress(1.0);

    let mut throttle = ProgressThrottle::default();
    let callback = on_progress.clone();
    runner
        .run_with_progress(cmd, move |progress| {
            if let Some(percent) = progress.percent() {
                if throttle.should_emit(percent) {
                    callback(percent);
                }
            }
        })
        .await
}
