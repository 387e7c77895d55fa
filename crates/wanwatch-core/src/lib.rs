// wanwatch-core: Link-state tracking and poll lifecycle between wanwatch-api and consumers (CLI).

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod monitor;
pub mod source;
pub mod tracker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MonitorConfig, SourceConfig, TlsVerification};
pub use error::CoreError;
pub use monitor::{Monitor, MonitorSnapshot, PollReport, SNAPSHOT_WINDOWS, WindowedBandwidth};
pub use source::Acquisition;
pub use tracker::StateTracker;

pub use model::{
    Bandwidth, InterfaceStatus, LinkEvent, LinkEventKind, LinkState, LinkStatus, TrafficSample,
};

// Consumers build configs without depending on the api crate directly.
pub use wanwatch_api::WantedInterfaces;
