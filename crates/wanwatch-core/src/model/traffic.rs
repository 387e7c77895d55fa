// ── Traffic samples and derived rates ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Octet counters observed at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSample {
    pub timestamp: DateTime<Utc>,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Average byte rates between the oldest and newest sample in a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bandwidth {
    /// Requested window length in seconds.
    pub window_secs: u64,
    /// Seconds actually spanned by the two samples used.
    pub elapsed_secs: f64,
    pub bytes_in_per_sec: f64,
    pub bytes_out_per_sec: f64,
}

impl Bandwidth {
    /// Rate between two samples, or `None` when under a second apart or
    /// when either counter went backwards (reset or wrap).
    pub fn between(window: Duration, oldest: &TrafficSample, newest: &TrafficSample) -> Option<Self> {
        let elapsed = (newest.timestamp - oldest.timestamp).to_std().ok()?;
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let delta_in = newest.bytes_in.checked_sub(oldest.bytes_in)?;
        let delta_out = newest.bytes_out.checked_sub(oldest.bytes_out)?;
        let secs = elapsed.as_secs_f64();

        Some(Self {
            window_secs: window.as_secs(),
            elapsed_secs: secs,
            bytes_in_per_sec: per_second(delta_in, secs),
            bytes_out_per_sec: per_second(delta_out, secs),
        })
    }

    pub fn bits_in_per_sec(&self) -> f64 {
        self.bytes_in_per_sec * 8.0
    }

    pub fn bits_out_per_sec(&self) -> f64 {
        self.bytes_out_per_sec * 8.0
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn per_second(delta: u64, secs: f64) -> f64 {
    delta as f64 / secs
}
