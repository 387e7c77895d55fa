// ── State tracker ──
//
// Owns per-interface link state, the transition event log, and traffic
// history. Mutated only through `apply`, one poll result at a time; the
// caller serializes calls (see `Monitor`).

mod events;
mod traffic;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::model::{Bandwidth, InterfaceStatus, LinkEvent, LinkEventKind, LinkState, TrafficSample};

pub use events::{EVENT_LOG_CAPACITY, EventLog};
pub use traffic::{TRAFFIC_RETENTION_SECS, TrafficHistory};

#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    links: BTreeMap<String, LinkState>,
    events: EventLog,
    traffic: TrafficHistory,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one successful poll into tracked state.
    ///
    /// Returns the events appended by this poll, in poll order.
    pub fn apply(&mut self, statuses: &[InterfaceStatus], now: DateTime<Utc>) -> Vec<LinkEvent> {
        let mut appended = Vec::new();

        for status in statuses {
            if let Some(event) = self.observe_link(status, now) {
                appended.push(event);
            }
            if let Some((bytes_in, bytes_out)) = status.byte_counters() {
                self.traffic.record(
                    &status.name,
                    TrafficSample {
                        timestamp: now,
                        bytes_in,
                        bytes_out,
                    },
                );
            }
        }

        appended
    }

    fn observe_link(&mut self, status: &InterfaceStatus, now: DateTime<Utc>) -> Option<LinkEvent> {
        let reading = status.link_up;

        let Some(state) = self.links.get_mut(&status.name) else {
            self.links.insert(
                status.name.clone(),
                LinkState {
                    link_up: reading,
                    last_change_time: now,
                },
            );
            let kind = LinkEventKind::from_status(reading)?;
            info!(interface = %status.name, state = %kind, "link first observed");
            return Some(self.events.push(&status.name, kind, now, None));
        };

        // Unknown is no information: never a transition, never stored.
        let kind = LinkEventKind::from_status(reading)?;
        if state.link_up == reading {
            return None;
        }

        // Stored Unknown means nothing resolved was seen yet; treat the
        // first resolved reading as a first observation.
        let duration_secs = state.link_up.is_resolved().then(|| {
            (now - state.last_change_time)
                .to_std()
                .map_or(0.0, |d| d.as_secs_f64())
        });
        state.link_up = reading;
        state.last_change_time = now;

        info!(
            interface = %status.name,
            state = %kind,
            previous_secs = ?duration_secs,
            "link transition"
        );
        Some(self.events.push(&status.name, kind, now, duration_secs))
    }

    /// Current link state per interface, by name.
    pub fn links(&self) -> &BTreeMap<String, LinkState> {
        &self.links
    }

    pub fn link(&self, name: &str) -> Option<&LinkState> {
        self.links.get(name)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn traffic(&self) -> &TrafficHistory {
        &self.traffic
    }

    /// Byte rates for `name` over the `window` ending at its latest
    /// sample, provided that sample is no older than `window` at `now`.
    pub fn bandwidth(&self, name: &str, window: Duration, now: DateTime<Utc>) -> Option<Bandwidth> {
        self.traffic.rate(name, window, now)
    }
}
