// Per-interface rolling counter history.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Bandwidth, TrafficSample};

/// How long samples are kept, in seconds.
pub const TRAFFIC_RETENTION_SECS: i64 = 70;

#[derive(Debug, Clone, Default)]
pub struct TrafficHistory {
    samples: HashMap<String, VecDeque<TrafficSample>>,
}

impl TrafficHistory {
    /// Append a sample and prune that interface's history to the
    /// retention window ending at the sample's timestamp.
    pub fn record(&mut self, interface: &str, sample: TrafficSample) {
        let history = self.samples.entry(interface.to_owned()).or_default();
        history.push_back(sample);

        let cutoff = sample.timestamp - TimeDelta::seconds(TRAFFIC_RETENTION_SECS);
        while history.front().is_some_and(|s| s.timestamp < cutoff) {
            history.pop_front();
        }
    }

    /// Rate over the `window` ending at the newest sample at or before `now`.
    ///
    /// The newest sample must itself lie within `window` of `now`, so a
    /// history that stopped updating goes unavailable. A window reaching
    /// past the representable time range has no lower bound. `None` with
    /// fewer than two samples, under one second of spread, or a counter
    /// reset.
    pub fn rate(&self, interface: &str, window: Duration, now: DateTime<Utc>) -> Option<Bandwidth> {
        let history = self.samples.get(interface)?;
        let span = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);

        let newest = history.iter().rev().find(|s| s.timestamp <= now)?;
        if now
            .checked_sub_signed(span)
            .is_some_and(|floor| newest.timestamp < floor)
        {
            return None;
        }

        let since = newest.timestamp.checked_sub_signed(span);
        let oldest = history
            .iter()
            .find(|s| since.is_none_or(|since| s.timestamp >= since))?;
        Bandwidth::between(window, oldest, newest)
    }

    pub fn samples(&self, interface: &str) -> Option<&VecDeque<TrafficSample>> {
        self.samples.get(interface)
    }

}
