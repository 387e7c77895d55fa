// ── Link state and transition events ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::interface::LinkStatus;

/// Last known link state of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkState {
    pub link_up: LinkStatus,
    /// Time of the most recent transition, or of first observation.
    pub last_change_time: DateTime<Utc>,
}

/// Direction of a recorded transition. Only resolved states are events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkEventKind {
    Up,
    Down,
}

impl LinkEventKind {
    /// `None` for `Unknown`.
    pub fn from_status(status: LinkStatus) -> Option<Self> {
        match status {
            LinkStatus::Up => Some(Self::Up),
            LinkStatus::Down => Some(Self::Down),
            LinkStatus::Unknown => None,
        }
    }
}

/// Immutable event log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEvent {
    /// Monotonic per-tracker counter, starting at 1.
    pub id: u64,
    pub interface_name: String,
    pub event: LinkEventKind,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent in the previous state; absent on first observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}
