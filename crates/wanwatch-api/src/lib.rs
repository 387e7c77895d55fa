// wanwatch-api: Async acquisition clients for firewall WAN interface status (digest REST + SNMP v2c)

pub mod digest;
pub mod error;
pub mod rest;
pub mod snmp;
pub mod transport;
pub mod wanted;

pub use error::Error;
pub use rest::{RestClient, RestInterface};
pub use snmp::{SnmpClient, SnmpInterface, SnmpSession};
pub use transport::{TlsMode, TransportConfig};
pub use wanted::WantedInterfaces;
