//! Deterministic derivation of output and preview paths.
//!
//! Paths are handled as strings so that either separator style round-trips
//! unchanged regardless of the host platform. Nothing here touches the
//! filesystem; an existing file at the derived path is overwritten by the
//! backend, not detected.

use ripley_models::{OperationKind, PreviewKind};

/// Base name used when the input has no file name component.
const FALLBACK_BASE_NAME: &str = "video";

/// Suffix of denoised outputs.
const DENOISE_SUFFIX: &str = "_denoised.mp4";

/// Split into (directory including trailing separator, file name).
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// File name without its extension.
///
/// A dot in first or last position does not start an extension.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}

/// Extension of the path's file name, without the dot.
pub(crate) fn extension(path: &str) -> Option<&str> {
    let (_, name) = split_parent(path);
    let stem = strip_extension(name);
    if stem.len() == name.len() {
        None
    } else {
        Some(&name[stem.len() + 1..])
    }
}

fn base_stem(input_path: &str) -> &str {
    let (_, name) = split_parent(input_path);
    if name.is_empty() {
        FALLBACK_BASE_NAME
    } else {
        strip_extension(name)
    }
}

/// Workspace directory with exactly one trailing separator.
///
/// The separator already trailing the directory wins; otherwise a
/// backslash if the directory uses backslashes anywhere, else a slash.
fn normalize_dir(workspace_dir: &str) -> String {
    let separator = if workspace_dir.ends_with('/') {
        '/'
    } else if workspace_dir.ends_with('\\') || workspace_dir.contains('\\') {
        '\\'
    } else {
        '/'
    };
    let trimmed = workspace_dir.trim_end_matches(['/', '\\']);
    format!("{}{}", trimmed, separator)
}

/// Directory derived files go to: the workspace, or the input's own directory.
fn target_dir(input_path: &str, workspace_dir: &str) -> String {
    if workspace_dir.trim().is_empty() {
        split_parent(input_path).0.to_string()
    } else {
        normalize_dir(workspace_dir)
    }
}

fn derive(input_path: &str, workspace_dir: &str, suffix: &str) -> String {
    format!("{}{}{}", target_dir(input_path, workspace_dir), base_stem(input_path), suffix)
}

/// Path of a converted file.
///
/// Without a workspace the input's extension is replaced (or `format`
/// appended) in place; with one, `<workspace>/<stem>.<format>`.
pub fn resolve_output_path(input_path: &str, format: &str, workspace_dir: &str) -> String {
    derive(input_path, workspace_dir, &format!(".{}", format))
}

/// Path of a preview: `<stem>_preview.jpg` or `<stem>_preview.mp4`.
pub fn resolve_preview_path(input_path: &str, kind: PreviewKind, workspace_dir: &str) -> String {
    derive(input_path, workspace_dir, kind.file_suffix())
}

/// Path of a denoised copy: `<stem>_denoised.mp4`.
pub fn resolve_denoise_path(input_path: &str, workspace_dir: &str) -> String {
    derive(input_path, workspace_dir, DENOISE_SUFFIX)
}

/// Target path for any operation kind.
pub fn resolve_target_path(input_path: &str, kind: &OperationKind, workspace_dir: &str) -> String {
    match kind {
        OperationKind::Convert { format } => resolve_output_path(input_path, format, workspace_dir),
        OperationKind::Preview { preview_kind, .. } => {
            resolve_preview_path(input_path, *preview_kind, workspace_dir)
        }
        OperationKind::Denoise => resolve_denoise_path(input_path, workspace_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", ""), "/a/b/clip.mp4");
        assert_eq!(resolve_output_path("C:\\vids\\x.avi", "webm", ""), "C:\\vids\\x.webm");
        assert_eq!(resolve_output_path("clip.mov", "mkv", ""), "clip.mkv");
    }

    #[test]
    fn test_output_path_appends_when_no_extension() {
        assert_eq!(resolve_output_path("/a/b/clip", "mp4", ""), "/a/b/clip.mp4");
        assert_eq!(resolve_output_path("/a/b/.hidden", "mp4", ""), "/a/b/.hidden.mp4");
        assert_eq!(resolve_output_path("/a.d/clip", "mp4", ""), "/a.d/clip.mp4");
    }

    #[test]
    fn test_output_path_in_workspace() {
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", "/out"), "/out/clip.mp4");
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", "/out/"), "/out/clip.mp4");
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", "/out//"), "/out/clip.mp4");
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", "/"), "/clip.mp4");
        assert_eq!(resolve_output_path("C:\\vids\\x.mov", "mp4", "D:\\work"), "D:\\work\\x.mp4");
        assert_eq!(resolve_output_path("C:\\vids\\x.mov", "mp4", "D:/work/"), "D:/work/x.mp4");
    }

    #[test]
    fn test_preview_paths() {
        assert_eq!(
            resolve_preview_path("C:\\vids\\x.mov", PreviewKind::Thumbnail, "C:\\work"),
            "C:\\work\\x_preview.jpg"
        );
        assert_eq!(
            resolve_preview_path("/a/b/clip.mov", PreviewKind::Clip, ""),
            "/a/b/clip_preview.mp4"
        );
        assert_eq!(
            resolve_preview_path("/a/b/my.clip.mov", PreviewKind::Thumbnail, "/w"),
            "/w/my.clip_preview.jpg"
        );
    }

    #[test]
    fn test_denoise_path() {
        assert_eq!(resolve_denoise_path("/a/b/talk.mkv", ""), "/a/b/talk_denoised.mp4");
        assert_eq!(resolve_denoise_path("/a/b/talk.mkv", "/w"), "/w/talk_denoised.mp4");
    }

    #[test]
    fn test_empty_base_name_falls_back() {
        assert_eq!(resolve_output_path("/a/b/", "mp4", "/w"), "/w/video.mp4");
    }

    #[test]
    fn test_blank_workspace_treated_as_unset() {
        assert_eq!(resolve_output_path("/a/b/clip.mov", "mp4", "  "), "/a/b/clip.mp4");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = resolve_output_path("/a/b/clip.mov", "mp4", "/out");
        let second = resolve_output_path("/a/b/clip.mov", "mp4", "/out");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("C:\\vids\\x.MOV"), Some("MOV"));
        assert_eq!(extension("/a.d/clip"), None);
        assert_eq!(extension("/a/.bashrc"), None);
        assert_eq!(extension("/a/clip."), None);
    }

    #[test]
    fn test_target_path_dispatch() {
        let kind = OperationKind::preview(PreviewKind::Clip, 1.0);
        assert_eq!(resolve_target_path("/a/x.mov", &kind, ""), "/a/x_preview.mp4");
        assert_eq!(resolve_target_path("/a/x.mov", &OperationKind::Denoise, ""), "/a/x_denoised.mp4");
    }
}
