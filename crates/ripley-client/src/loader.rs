//! Resolve finished result paths into something a viewer can render.
//!
//! Strategies run in a fixed order until one resolves:
//!
//! 1. [`CompatibilityCheck`] rejects extensions the built-in viewer cannot play
//! 2. [`InlineData`] embeds the file as a `data:` URI
//! 3. [`DirectReference`] points at the file through a URI with a known scheme
//!
//! When none resolves, the most specific failure reason seen wins. The
//! loader never consults the operation controller; it only sees the path.

use std::sync::Arc;

use async_trait::async_trait;
use ripley_models::{LoadFailureReason, LoadOutcome, LoadResult, RenderError, ResourceSource};
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::MediaAccess;
use crate::error::{BackendError, BackendResult};
use crate::paths;

/// Extensions the built-in viewer renders.
pub const RENDERABLE_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "ogv", "jpg", "jpeg", "png", "gif", "webp"];

/// URI schemes accepted from a [`ReferenceBuilder`].
pub const KNOWN_SCHEMES: &[&str] = &["file", "asset", "http", "https", "data", "blob"];

/// Result of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Stop here with this outcome
    Resolved(LoadOutcome),
    /// Try the next strategy, remembering why this one failed
    Continue(Option<LoadFailureReason>),
}

/// One step of the fallback chain.
#[async_trait]
pub trait LoadStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, path: &str) -> StrategyOutcome;
}

/// Turns a verified filesystem path into a URI.
pub trait ReferenceBuilder: Send + Sync {
    fn build(&self, path: &str) -> Option<String>;
}

/// Builds `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUrlBuilder;

impl ReferenceBuilder for FileUrlBuilder {
    fn build(&self, path: &str) -> Option<String> {
        Url::from_file_path(path).ok().map(String::from)
    }
}

fn failure_reason(err: &BackendError) -> LoadFailureReason {
    match err {
        BackendError::NotFound(_) => LoadFailureReason::NotFound,
        BackendError::TooLarge(_) => LoadFailureReason::TooLarge,
        BackendError::AccessDenied(_) => LoadFailureReason::AccessDenied,
        other => LoadFailureReason::Unknown(other.to_string()),
    }
}

/// Short-circuits unless the extension is in [`RENDERABLE_EXTENSIONS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityCheck;

#[async_trait]
impl LoadStrategy for CompatibilityCheck {
    fn name(&self) -> &'static str {
        "compatibility_check"
    }

    async fn attempt(&self, path: &str) -> StrategyOutcome {
        // No extension means the type is unknown; treat it like any other unlisted one
        let ext = paths::extension(path).map(str::to_ascii_lowercase).unwrap_or_default();
        if RENDERABLE_EXTENSIONS.contains(&ext.as_str()) {
            StrategyOutcome::Continue(None)
        } else {
            StrategyOutcome::Resolved(LoadOutcome::Unplayable {
                reason: LoadFailureReason::ExternalViewerRequired(ext),
            })
        }
    }
}

/// Embeds the whole file.
pub struct InlineData {
    access: Arc<dyn MediaAccess>,
}

impl InlineData {
    pub fn new(access: Arc<dyn MediaAccess>) -> Self {
        Self { access }
    }
}

#[async_trait]
impl LoadStrategy for InlineData {
    fn name(&self) -> &'static str {
        "inline_data"
    }

    async fn attempt(&self, path: &str) -> StrategyOutcome {
        match self.access.read_media_as_data_uri(path).await {
            Ok(uri) => StrategyOutcome::Resolved(LoadOutcome::Renderable {
                uri,
                source: ResourceSource::InlineData,
            }),
            Err(e) => {
                debug!("Inline load of {} failed: {}", path, e);
                StrategyOutcome::Continue(Some(failure_reason(&e)))
            }
        }
    }
}

/// References the file in place, trying several spellings of its path.
pub struct DirectReference {
    access: Arc<dyn MediaAccess>,
    builder: Arc<dyn ReferenceBuilder>,
}

impl DirectReference {
    pub fn new(access: Arc<dyn MediaAccess>, builder: Arc<dyn ReferenceBuilder>) -> Self {
        Self { access, builder }
    }

    /// Path spellings in the order they are tried, without duplicates.
    pub fn variants(path: &str) -> Vec<String> {
        let normalized = path.replace('\\', "/");
        let mut candidates = vec![path.to_string()];
        if has_drive_letter(&normalized) {
            candidates.push(format!("/{}", normalized));
        }
        candidates.push(normalized.clone());
        candidates.push(normalized.trim_start_matches('/').to_string());

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn has_known_scheme(uri: &str) -> bool {
    Url::parse(uri)
        .map(|url| KNOWN_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

#[async_trait]
impl LoadStrategy for DirectReference {
    fn name(&self) -> &'static str {
        "direct_reference"
    }

    async fn attempt(&self, path: &str) -> StrategyOutcome {
        let verified = match self.access.resolve_canonical_path(path).await {
            Ok(verified) => verified,
            Err(e) => return StrategyOutcome::Continue(Some(failure_reason(&e))),
        };

        for variant in Self::variants(&verified) {
            match self.builder.build(&variant) {
                Some(uri) if has_known_scheme(&uri) => {
                    return StrategyOutcome::Resolved(LoadOutcome::Renderable {
                        uri,
                        source: ResourceSource::DirectReference,
                    });
                }
                Some(uri) => debug!("Rejected reference with unknown scheme: {}", uri),
                None => debug!("No reference for path variant {}", variant),
            }
        }

        StrategyOutcome::Continue(Some(LoadFailureReason::Unknown(
            "no usable reference for the file".to_string(),
        )))
    }
}

/// Keep the first specific reason; `Unknown` only fills a gap.
fn merge_reason(current: Option<LoadFailureReason>, next: Option<LoadFailureReason>) -> Option<LoadFailureReason> {
    match (current, next) {
        (None, next) => next,
        (Some(LoadFailureReason::Unknown(_)), Some(next)) if !matches!(next, LoadFailureReason::Unknown(_)) => {
            Some(next)
        }
        (current, _) => current,
    }
}

/// Ordered fallback chain producing a [`LoadResult`] per path.
pub struct MediaResourceLoader {
    access: Arc<dyn MediaAccess>,
    strategies: Vec<Box<dyn LoadStrategy>>,
}

impl MediaResourceLoader {
    /// Default chain: compatibility check, inline data, direct `file://` reference.
    pub fn new(access: Arc<dyn MediaAccess>) -> Self {
        let strategies: Vec<Box<dyn LoadStrategy>> = vec![
            Box::new(CompatibilityCheck),
            Box::new(InlineData::new(access.clone())),
            Box::new(DirectReference::new(access.clone(), Arc::new(FileUrlBuilder))),
        ];
        Self::with_strategies(access, strategies)
    }

    pub fn with_strategies(access: Arc<dyn MediaAccess>, strategies: Vec<Box<dyn LoadStrategy>>) -> Self {
        Self { access, strategies }
    }

    /// Run the chain for `path`.
    pub async fn load(&self, path: &str) -> LoadResult {
        if path.trim().is_empty() {
            return LoadResult::unplayable(path, LoadFailureReason::NotFound);
        }

        let mut reason = None;
        for strategy in &self.strategies {
            match strategy.attempt(path).await {
                StrategyOutcome::Resolved(outcome) => {
                    debug!(strategy = strategy.name(), "Resolved {}", path);
                    return LoadResult { path: path.to_string(), outcome };
                }
                StrategyOutcome::Continue(next) => {
                    reason = merge_reason(reason, next);
                }
            }
        }

        let reason =
            reason.unwrap_or_else(|| LoadFailureReason::Unknown("no strategy could load the resource".to_string()));
        info!(reason = reason.as_str(), "Unable to render {}", path);
        LoadResult::unplayable(path, reason)
    }

    /// Move a rendered result to unplayable after the viewer reported `error`.
    pub fn reclassify(result: &LoadResult, error: RenderError) -> LoadResult {
        LoadResult::unplayable(result.path.clone(), error.into())
    }

    /// Hand the file to the platform viewer.
    pub async fn open_externally(&self, path: &str) -> BackendResult<()> {
        self.access.open_externally(path).await
    }
}

/// The result currently shown for one path.
#[derive(Debug, Clone, Default)]
pub struct ResourceView {
    current: Option<LoadResult>,
}

impl ResourceView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was shown with a fresh load of `path`.
    pub async fn show(&mut self, loader: &MediaResourceLoader, path: &str) -> &LoadResult {
        let result = loader.load(path).await;
        self.current.insert(result)
    }

    /// Record a render failure. Returns whether the view changed.
    pub fn report_render_error(&mut self, error: RenderError) -> bool {
        match &self.current {
            Some(result) if result.is_renderable() => {
                warn!("Render failed for {}: {:?}", result.path, error);
                self.current = Some(MediaResourceLoader::reclassify(result, error));
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&LoadResult> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
