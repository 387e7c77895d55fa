pub mod client;
pub mod coerce;
pub mod models;
pub mod oids;
pub mod session;

pub use client::{SnmpClient, collect_interfaces, interface_name};
pub use models::SnmpInterface;
pub use session::SnmpSession;
