//! Audio denoising pipeline.
//!
//! Three stages, each owning a slice of the overall progress:
//! 1. extract the audio track as 48 kHz WAV (0-33%)
//! 2. clean it with deep-filter (33-66%)
//! 3. remux the original video with the cleaned audio (66-100%)
//!
//! Intermediate files live in a scratch directory that is removed on every
//! exit path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::command::{DeepFilterCommand, FfmpegCommand, FfmpegRunner};
use crate::config::MediaConfig;
use crate::convert::run_tracked;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_parent_dir, require_input, require_valid_output};
use crate::progress::ProgressCallback;

/// Maps stage-local percentages onto a window of the overall progress.
#[derive(Clone)]
pub struct StageProgress {
    callback: ProgressCallback,
}

impl StageProgress {
    pub fn new(callback: ProgressCallback) -> Self {
        Self { callback }
    }

    /// Callback scaling 0-100 into `start..end`.
    pub fn window(&self, start: f64, end: f64) -> ProgressCallback {
        let callback = Arc::clone(&self.callback);
        Arc::new(move |percent: f64| {
            let percent = percent.clamp(0.0, 100.0);
            callback(start + (end - start) * percent / 100.0);
        })
    }

    /// Report an absolute overall value.
    pub fn mark(&self, value: f64) {
        (self.callback)(value);
    }
}

fn remux_command(input: &Path, denoised_audio: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .extra_input(denoised_audio)
        .output_args(["-map", "0:v", "-map", "1:a"])
        .video_codec("libx264")
        .audio_codec("aac")
        .preset("medium")
        .crf(23)
        .output_args(["-movflags", "+faststart", "-pix_fmt", "yuv420p", "-profile:v", "high", "-level", "4.0"])
        .audio_bitrate("192k")
        .output_args(["-strict", "-2", "-shortest"])
        .video_filter("scale=iw:ih")
        .output_args(["-max_muxing_queue_size", "1024"])
}

/// Denoise the audio track of `input`, writing the result to `output`.
pub async fn denoise_video(
    config: &MediaConfig,
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    on_progress: ProgressCallback,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    require_input(input).await?;
    ensure_parent_dir(output).await?;
    let deep_filter = config.deep_filter_path()?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("video")
        .to_string();

    tokio::fs::create_dir_all(&config.work_dir).await?;
    let scratch = tempfile::Builder::new()
        .prefix("ripleyflow_denoise_")
        .tempdir_in(&config.work_dir)?;
    let denoised_dir = scratch.path().join("denoised");
    tokio::fs::create_dir_all(&denoised_dir).await?;

    let stages = StageProgress::new(on_progress);
    info!("Denoising {} -> {}", input.display(), output.display());

    let result = async {
        let wav = scratch.path().join(format!("{}.wav", stem));
        let extract = FfmpegCommand::new(input, &wav).output_args(["-vn", "-ar", "48000"]);
        run_tracked(runner, &extract, stages.window(0.0, 33.0))
            .await
            .map_err(|e| e.in_stage("Failed to extract audio"))?;
        stages.mark(33.0);

        let filter = DeepFilterCommand::new(&wav, &denoised_dir);
        runner
            .run_deep_filter(&deep_filter, &filter)
            .await
            .map_err(|e| e.in_stage("Failed to denoise audio"))?;
        stages.mark(66.0);

        let denoised_wav = filter.output_file();
        require_valid_output(&denoised_wav, "Denoised WAV file").await?;

        let remux = remux_command(input, &denoised_wav, output);
        run_tracked(runner, &remux, stages.window(66.0, 100.0))
            .await
            .map_err(|e| e.in_stage("Failed to combine video and audio"))?;

        require_valid_output(output, "Output video file").await?;
        Ok::<_, MediaError>(output.to_path_buf())
    }
    .await;

    if let Err(e) = scratch.close() {
        warn!("Failed to remove denoise scratch directory: {}", e);
    }

    if result.is_ok() {
        stages.mark(100.0);
    }
    result
}
