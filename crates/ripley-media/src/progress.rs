//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Input duration in milliseconds, once the banner has been seen
    pub total_duration_ms: Option<i64>,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).clamp(0.0, 100.0)
    }

    /// Percentage against the parsed input duration.
    pub fn percent(&self) -> Option<f64> {
        if self.is_complete {
            return Some(100.0);
        }
        self.total_duration_ms.map(|total| self.percentage(total))
    }
}

/// Callback receiving overall percentages (0-100).
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync + 'static>;

/// Parse the `Duration: HH:MM:SS.ss,` line of FFmpeg's input banner.
pub fn parse_banner_duration(line: &str) -> Option<i64> {
    let rest = line.split("Duration: ").nth(1)?;
    let stamp = rest.split(',').next()?.trim();
    parse_clock_ms(stamp)
}

/// Parse `HH:MM:SS(.frac)` into milliseconds.
pub fn parse_clock_ms(stamp: &str) -> Option<i64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(((hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0).round() as i64)
}

/// Rate limiter for progress emission.
///
/// A value passes when it moved more than `min_step` percentage points, or
/// when `min_interval` elapsed since the last emitted value.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    min_step: f64,
    min_interval: Duration,
    last_value: Option<f64>,
    last_emit: Option<Instant>,
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(0.5, Duration::from_millis(200))
    }
}

impl ProgressThrottle {
    pub fn new(min_step: f64, min_interval: Duration) -> Self {
        Self {
            min_step,
            min_interval,
            last_value: None,
            last_emit: None,
        }
    }

    /// Whether `value` should be emitted now. Records it if so.
    pub fn should_emit(&mut self, value: f64) -> bool {
        let now = Instant::now();
        let emit = match (self.last_value, self.last_emit) {
            (Some(last), Some(at)) => {
                value >= 100.0 || (value - last).abs() > self.min_step || now.duration_since(at) >= self.min_interval
            }
            _ => true,
        };
        if emit {
            self.last_value = Some(value);
            self.last_emit = Some(now);
        }
        emit
    }
}
