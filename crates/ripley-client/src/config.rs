//! Client configuration.

use std::time::Duration;

use ripley_progress::DEFAULT_CAPACITY;
use ripley_storage::DEFAULT_INLINE_CEILING_BYTES;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay between `Completed` and the automatic return to `Idle`
    pub completion_grace: Duration,
    /// Largest file embedded inline by the resource loader
    pub inline_ceiling_bytes: u64,
    /// Default position for preview extraction
    pub preview_timestamp_secs: f64,
    /// Buffered progress events per subscriber
    pub progress_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            completion_grace: Duration::from_millis(500),
            inline_ceiling_bytes: DEFAULT_INLINE_CEILING_BYTES,
            preview_timestamp_secs: 1.0,
            progress_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            completion_grace: Duration::from_millis(
                std::env::var("RIPLEY_COMPLETION_GRACE_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            inline_ceiling_bytes: std::env::var("RIPLEY_INLINE_CEILING_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_INLINE_CEILING_BYTES),
            preview_timestamp_secs: std::env::var("RIPLEY_PREVIEW_TIMESTAMP_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                .unwrap_or(1.0),
            progress_capacity: std::env::var("RIPLEY_PROGRESS_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }

    /// Same config with a different completion grace delay.
    pub fn with_completion_grace(mut self, grace: Duration) -> Self {
        self.completion_grace = grace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.completion_grace, Duration::from_millis(500));
        assert_eq!(config.inline_ceiling_bytes, 100 * 1024 * 1024);
        assert_eq!(config.preview_timestamp_secs, 1.0);
    }

    #[test]
    fn test_zero_grace_allowed() {
        let config = ClientConfig::default().with_completion_grace(Duration::ZERO);
        assert!(config.completion_grace.is_zero());
    }
}
