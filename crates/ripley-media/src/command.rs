//! FFmpeg and deep-filter command builders and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_banner_duration, FfmpegProgress};

/// Number of stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Primary input file path
    input: PathBuf,
    /// Additional inputs, each preceded by `-i`
    extra_inputs: Vec<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    ///
    /// The default log level keeps the input banner so the duration can be
    /// read for progress reporting.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            extra_inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "info".to_string(),
        }
    }

    /// Add another input file.
    pub fn extra_input(mut self, input: impl AsRef<Path>) -> Self {
        self.extra_inputs.push(input.as_ref().to_path_buf());
        self
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position (before input), formatted `HH:MM:SS.ss`.
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(crate::preview::format_timestamp(seconds))
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Extract single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-vframes").output_arg("1")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output path of this command.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());
        args.push("-nostats".to_string());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        for extra in &self.extra_inputs {
            args.push("-i".to_string());
            args.push(extra.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Builder for deep-filter invocations.
#[derive(Debug, Clone)]
pub struct DeepFilterCommand {
    input: PathBuf,
    output_dir: PathBuf,
    compensate_delay: bool,
}

impl DeepFilterCommand {
    pub fn new(input: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            compensate_delay: true,
        }
    }

    /// Path deep-filter writes the cleaned audio to.
    pub fn output_file(&self) -> PathBuf {
        let name = self
            .input
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "audio.wav".into());
        self.output_dir.join(name)
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![self.input.to_string_lossy().to_string()];
        if self.compensate_delay {
            args.push("-D".to_string());
        }
        args.push("-o".to_string());
        args.push(self.output_dir.to_string_lossy().to_string());
        args
    }
}

/// Runner for external media tools with progress tracking and cancellation.
pub struct FfmpegRunner {
    /// FFmpeg binary
    ffmpeg: PathBuf,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner using `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Use a specific ffmpeg binary.
    pub fn with_binary(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: FnMut(FfmpegProgress) + Send + 'static,
    {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.ffmpeg.display(), args.join(" "));

        let mut child = spawn(&self.ffmpeg, &args)?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("stderr not captured", None, None))?;
        let mut reader = BufReader::new(stderr).lines();

        // Spawn progress parsing task
        let mut progress_callback = progress_callback;
        let progress_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                    progress_callback(progress);
                } else if !is_progress_key(&line) && !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let result = self.wait_for_completion(&mut child, "FFmpeg").await;
        let stderr_tail = progress_handle.await.unwrap_or_default();

        let status = result?;
        if status.success() {
            Ok(())
        } else {
            let last_line = stderr_tail.lines().last().unwrap_or("no error output").to_string();
            Err(MediaError::ffmpeg_failed(
                format!("exited with {}: {}", status, last_line),
                Some(stderr_tail),
                status.code(),
            ))
        }
    }

    /// Run deep-filter.
    pub async fn run_deep_filter(&self, binary: &Path, cmd: &DeepFilterCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running deep-filter: {} {}", binary.display(), args.join(" "));

        let mut child = spawn(binary, &args)?;
        let stderr = child.stderr.take();
        let stderr_handle = tokio::spawn(async move {
            let mut last = String::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    if !line.trim().is_empty() {
                        last = line;
                    }
                }
            }
            last
        });

        let result = self.wait_for_completion(&mut child, "deep-filter").await;
        let last_line = stderr_handle.await.unwrap_or_default();

        let status = result?;
        if status.success() {
            Ok(())
        } else {
            Err(MediaError::deep_filter_failed(
                format!("exited with {}: {}", status, last_line),
                status.code(),
            ))
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child, tool: &str) -> MediaResult<ExitStatus> {
        let cancel_rx = self.cancel_rx.clone();
        let cancelled = async move {
            match cancel_rx {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let timeout_secs = self.timeout_secs;
        let deadline = async move {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            status = child.wait() => Ok(status?),
            _ = cancelled => {
                info!("{} cancelled, killing process", tool);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", tool, e);
                }
                Err(MediaError::Cancelled)
            }
            _ = deadline => {
                let secs = timeout_secs.unwrap_or_default();
                warn!("{} timed out after {} seconds, killing process", tool, secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
        }
    }
}

fn spawn(binary: &Path, args: &[String]) -> MediaResult<Child> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    Ok(command.spawn()?)
}

fn is_progress_key(line: &str) -> bool {
    matches!(
        line.trim().split_once('=').map(|(k, _)| k),
        Some(
            "frame" | "fps" | "stream_0_0_q" | "bitrate" | "total_size" | "out_time_us" | "out_time_ms"
                | "out_time" | "dup_frames" | "drop_frames" | "speed" | "progress"
        )
    )
}

/// Parse a line of FFmpeg stderr: the input banner or `-progress` output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    if current.total_duration_ms.is_none() {
        if let Some(duration) = parse_banner_duration(line) {
            current.total_duration_ms = Some(duration);
            return None;
        }
    }

    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds in current FFmpeg releases
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}
