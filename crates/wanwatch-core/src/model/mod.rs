// ── Domain model ──
//
// Backend-agnostic types. Both acquisition backends normalize into
// `InterfaceStatus`; everything downstream (tracker, monitor, CLI)
// depends only on this module.

pub mod interface;
pub mod link;
pub mod traffic;

pub use interface::{InterfaceStatus, LinkStatus};
pub use link::{LinkEvent, LinkEventKind, LinkState};
pub use traffic::{Bandwidth, TrafficSample};
