// ── MIB-II / IF-MIB object identifiers ──

use async_snmp::Oid;

/// `ifDescr` (IF-MIB ifTable column 2).
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];

/// `ipAdEntAddr` (ipAddrTable column 1), indexed by the address itself.
pub const IP_AD_ENT_ADDR: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 1];
/// `ipAdEntIfIndex`.
pub const IP_AD_ENT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 2];
/// `ipAdEntNetMask`.
pub const IP_AD_ENT_NET_MASK: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 3];

/// Per-interface columns fetched in the batched GET, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColumn {
    OperStatus,
    Speed,
    PhysAddress,
    Mtu,
    LastChange,
    HcInOctets,
    HcOutOctets,
    HcInUcastPkts,
    HcOutUcastPkts,
    InErrors,
    OutErrors,
}

impl StatusColumn {
    pub const ALL: [Self; 11] = [
        Self::OperStatus,
        Self::Speed,
        Self::PhysAddress,
        Self::Mtu,
        Self::LastChange,
        Self::HcInOctets,
        Self::HcOutOctets,
        Self::HcInUcastPkts,
        Self::HcOutUcastPkts,
        Self::InErrors,
        Self::OutErrors,
    ];

    /// Column OID without the interface index.
    pub fn arcs(self) -> &'static [u32] {
        match self {
            Self::OperStatus => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8],
            Self::Speed => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5],
            Self::PhysAddress => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 6],
            Self::Mtu => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4],
            Self::LastChange => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 9],
            Self::HcInOctets => &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6],
            Self::HcOutOctets => &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10],
            Self::HcInUcastPkts => &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 7],
            Self::HcOutUcastPkts => &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 11],
            Self::InErrors => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14],
            Self::OutErrors => &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20],
        }
    }

    /// Instance OID for one interface.
    pub fn instance(self, if_index: u32) -> Oid {
        Oid::from_slice(self.arcs()).child(if_index)
    }
}
