//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use ripley_models::PreviewKind;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "RipleyFlow: convert videos, extract previews and denoise audio",
    long_about = "Runs conversions, previews and audio denoising locally with ffmpeg and deep-filter. \
                  Results go to the saved workspace directory, or next to the input when none is set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a video to another container format
    Convert(ConvertArgs),
    /// Extract a thumbnail or a short clip
    Preview(PreviewArgs),
    /// Remove background noise from a video's audio track
    Denoise(DenoiseArgs),
    /// Open a file in the system's default player
    Open {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Describe a file and how it would be displayed
    Info {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Show or change the workspace directory
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Target format (mp4, webm, avi, mov, mkv, ...)
    #[arg(short, long, default_value = "mp4")]
    pub format: String,

    /// Resolve the result for display afterwards
    #[arg(long)]
    pub load: bool,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// thumbnail or clip
    #[arg(short, long, default_value = "thumbnail", value_parser = parse_preview_kind)]
    pub kind: PreviewKind,

    /// Position in seconds
    #[arg(short, long, env = "RIPLEY_PREVIEW_TIMESTAMP_SECS")]
    pub timestamp: Option<f64>,

    /// Resolve the result for display afterwards
    #[arg(long)]
    pub load: bool,
}

#[derive(Args, Debug)]
pub struct DenoiseArgs {
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Resolve the result for display afterwards
    #[arg(long)]
    pub load: bool,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the settings file location and workspace directory
    Show,
    /// Save a new workspace directory, creating it if needed
    Set {
        #[arg(value_name = "DIR")]
        directory: String,
    },
}

fn parse_preview_kind(value: &str) -> Result<PreviewKind, String> {
    value.parse().map_err(|e: ripley_models::ModelError| e.to_string())
}
