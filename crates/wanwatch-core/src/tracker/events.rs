use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::model::{LinkEvent, LinkEventKind};

/// Maximum number of retained events.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Bounded, newest-first transition log.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LinkEvent>,
    next_id: u64,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            next_id: 1,
            capacity,
        }
    }

    /// Record an event at the front, dropping the oldest on overflow.
    pub fn push(
        &mut self,
        interface_name: &str,
        event: LinkEventKind,
        timestamp: DateTime<Utc>,
        duration_secs: Option<f64>,
    ) -> LinkEvent {
        let entry = LinkEvent {
            id: self.next_id,
            interface_name: interface_name.to_owned(),
            event,
            timestamp,
            duration_secs,
        };
        self.next_id += 1;
        self.entries.push_front(entry.clone());
        self.entries.truncate(self.capacity);
        entry
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LinkEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy, newest first.
    pub fn to_vec(&self) -> Vec<LinkEvent> {
        self.entries.iter().cloned().collect()
    }
}
