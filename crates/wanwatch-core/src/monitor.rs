// ── Monitor ──
//
// Long-lived owner of one acquisition source and its state tracker.
// Polls are serialized; a poll applies to the tracker only after the
// acquisition succeeded in full. Readers get owned snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::model::{Bandwidth, InterfaceStatus, LinkEvent, LinkState};
use crate::source::Acquisition;
use crate::tracker::StateTracker;

const EVENT_CHANNEL_SIZE: usize = 128;

/// Windows reported in every snapshot.
pub const SNAPSHOT_WINDOWS: [Duration; 2] = [Duration::from_secs(10), Duration::from_secs(60)];

/// Result of one successful poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollReport {
    pub polled_at: DateTime<Utc>,
    pub interfaces: Vec<InterfaceStatus>,
    /// Events this poll appended, in poll order.
    pub events: Vec<LinkEvent>,
}

/// Rate for one interface over one window; `rate` is `None` when unavailable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowedBandwidth {
    pub window_secs: u64,
    pub rate: Option<Bandwidth>,
}

/// Owned copy of everything the tracker knows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub server_started_at: DateTime<Utc>,
    pub method: &'static str,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub links: BTreeMap<String, LinkState>,
    /// Newest first, at most 100.
    pub events: Vec<LinkEvent>,
    pub bandwidth: BTreeMap<String, Vec<WindowedBandwidth>>,
}

#[derive(Debug, Default)]
struct PollHealth {
    last_poll_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Cheaply cloneable via `Arc<MonitorInner>`.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    source: Acquisition,
    started_at: DateTime<Utc>,
    poll_lock: Mutex<()>,
    tracker: RwLock<StateTracker>,
    health: RwLock<PollHealth>,
    event_tx: broadcast::Sender<LinkEvent>,
    latest: watch::Sender<Option<PollReport>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Build the acquisition backend and an empty tracker. Does not poll.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        if config.wanted.is_empty() {
            return Err(CoreError::Config {
                message: "no interfaces to monitor".into(),
            });
        }
        if config.refresh_interval.is_zero() {
            return Err(CoreError::Config {
                message: "refresh interval must be greater than zero".into(),
            });
        }

        let source = Acquisition::from_config(&config)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (latest, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                source,
                started_at: Utc::now(),
                poll_lock: Mutex::new(()),
                tracker: RwLock::new(StateTracker::new()),
                health: RwLock::new(PollHealth::default()),
                event_tx,
                latest,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one acquisition and fold it into tracked state.
    ///
    /// Concurrent callers queue behind each other. On failure nothing
    /// tracked changes except the recorded last error.
    pub async fn poll_once(&self) -> Result<PollReport, CoreError> {
        let _guard = self.inner.poll_lock.lock().await;

        let interfaces = match self.inner.source.poll(&self.inner.config.wanted).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                self.inner.health.write().await.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let polled_at = Utc::now();
        let events = self.inner.tracker.write().await.apply(&interfaces, polled_at);
        {
            let mut health = self.inner.health.write().await;
            health.last_poll_at = Some(polled_at);
            health.last_error = None;
        }

        for event in &events {
            // No subscribers is fine.
            let _ = self.inner.event_tx.send(event.clone());
        }

        let report = PollReport {
            polled_at,
            interfaces,
            events,
        };
        self.inner.latest.send_replace(Some(report.clone()));
        debug!(
            interfaces = report.interfaces.len(),
            events = report.events.len(),
            "poll applied"
        );
        Ok(report)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the background poll loop. The first poll runs immediately.
    /// Calling `start` on a running monitor is a no-op.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() || self.inner.cancel.is_cancelled() {
            return;
        }

        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        let interval = self.inner.config.refresh_interval;
        handles.push(tokio::spawn(poll_task(monitor, interval, cancel)));
        info!(
            method = self.inner.source.method(),
            interval_secs = interval.as_secs(),
            "monitor started"
        );
    }

    /// Cancel the poll loop and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("monitor stopped");
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Subscribe to link events as they are recorded.
    pub fn events(&self) -> broadcast::Receiver<LinkEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Watch the most recent successful poll.
    pub fn latest(&self) -> watch::Receiver<Option<PollReport>> {
        self.inner.latest.subscribe()
    }

    /// Byte rates for one interface over the trailing `window`.
    pub async fn bandwidth(&self, name: &str, window: Duration) -> Option<Bandwidth> {
        self.inner
            .tracker
            .read()
            .await
            .bandwidth(name, window, Utc::now())
    }

    /// Owned copy of link states, events, and bandwidth.
    pub async fn snapshot(&self) -> MonitorSnapshot {
        let now = Utc::now();
        let (links, events, bandwidth) = {
            let tracker = self.inner.tracker.read().await;
            let bandwidth = tracker
                .links()
                .keys()
                .map(|name| {
                    let windows = SNAPSHOT_WINDOWS
                        .iter()
                        .map(|window| WindowedBandwidth {
                            window_secs: window.as_secs(),
                            rate: tracker.bandwidth(name, *window, now),
                        })
                        .collect();
                    (name.clone(), windows)
                })
                .collect();
            (tracker.links().clone(), tracker.events().to_vec(), bandwidth)
        };
        let health = self.inner.health.read().await;

        MonitorSnapshot {
            server_started_at: self.started_at(),
            method: self.inner.source.method(),
            last_poll_at: health.last_poll_at,
            last_error: health.last_error.clone(),
            links,
            events,
            bandwidth,
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll at a fixed interval until cancelled. Failures are logged and
/// never end the loop.
async fn poll_task(monitor: Monitor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = monitor.poll_once().await {
                    warn!(error = %e, "poll failed");
                }
            }
        }
    }
}
