use std::net::Ipv4Addr;

use serde::Serialize;

/// One interface row assembled from IF-MIB, IF-MIB HC counters, and
/// ipAddrTable. Values are raw; formatting happens in the core crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnmpInterface {
    /// ifIndex.
    pub index: u32,
    /// Uppercased `X<digits>` name resolved from ifDescr.
    pub name: String,
    /// ifOperStatus (1 = up, 2 = down, others per IF-MIB).
    pub oper_status: Option<i64>,
    /// ifSpeed in bits per second.
    pub speed: Option<u64>,
    pub phys_address: Option<Vec<u8>>,
    pub mtu: Option<u64>,
    /// ifLastChange in hundredths of a second since agent start.
    pub last_change: Option<u64>,
    pub ip_address: Option<Ipv4Addr>,
    pub subnet_mask: Option<Ipv4Addr>,
    pub bytes_in: Option<u64>,
    pub bytes_out: Option<u64>,
    pub packets_in: Option<u64>,
    pub packets_out: Option<u64>,
    pub errors_in: Option<u64>,
    pub errors_out: Option<u64>,
}
