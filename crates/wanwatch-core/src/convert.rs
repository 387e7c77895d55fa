// ── API-to-domain type conversions ──
//
// Bridges raw records from `wanwatch_api` into the canonical
// `InterfaceStatus`. Both backends land in the same shape so the
// tracker never knows which one produced a poll.

use wanwatch_api::{RestInterface, SnmpInterface};

use crate::model::{InterfaceStatus, LinkStatus};

/// Zone reported for every SNMP-sourced interface.
const SNMP_ZONE: &str = "WAN";

impl From<RestInterface> for InterfaceStatus {
    fn from(iface: RestInterface) -> Self {
        Self {
            link_up: LinkStatus::from_text(iface.status.as_deref()),
            name: iface.name,
            ip_address: iface.ip_address,
            subnet_mask: iface.subnet_mask,
            link_speed: iface.link_speed,
            ip_mode: iface.ip_mode,
            zone: iface.zone,
            comment: iface.comment,
            ..Self::default()
        }
    }
}

impl From<SnmpInterface> for InterfaceStatus {
    fn from(iface: SnmpInterface) -> Self {
        Self {
            name: iface.name,
            link_up: LinkStatus::from_oper_status(iface.oper_status),
            ip_address: iface.ip_address.map(|ip| ip.to_string()),
            subnet_mask: iface.subnet_mask.map(|mask| mask.to_string()),
            link_speed: iface.speed.map(format_speed),
            ip_mode: None,
            zone: Some(SNMP_ZONE.to_owned()),
            comment: None,
            mac_address: iface.phys_address.as_deref().and_then(format_mac),
            mtu: iface.mtu,
            bytes_in: iface.bytes_in,
            bytes_out: iface.bytes_out,
            packets_in: iface.packets_in,
            packets_out: iface.packets_out,
            errors_in: iface.errors_in,
            errors_out: iface.errors_out,
            last_change_ticks: iface.last_change,
        }
    }
}

/// Format a bit rate in the largest unit it reaches, rounded to a whole
/// number: `1_000_000_000` → `"1 Gbps"`.
pub fn format_speed(bps: u64) -> String {
    const UNITS: [(u64, &str); 3] = [
        (1_000_000_000, "Gbps"),
        (1_000_000, "Mbps"),
        (1_000, "Kbps"),
    ];

    for (scale, unit) in UNITS {
        if bps >= scale {
            let whole = bps / scale + u64::from(bps % scale >= scale / 2);
            return format!("{whole} {unit}");
        }
    }
    format!("{bps} bps")
}

/// Format a six-byte hardware address as `AA:BB:CC:DD:EE:FF`.
pub fn format_mac(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 6 {
        return None;
    }
    Some(
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    #[test]
    fn speed_uses_largest_fitting_unit() {
        assert_eq!(format_speed(0), "0 bps");
        assert_eq!(format_speed(999), "999 bps");
        assert_eq!(format_speed(10_000), "10 Kbps");
        assert_eq!(format_speed(100_000_000), "100 Mbps");
        assert_eq!(format_speed(1_000_000_000), "1 Gbps");
        assert_eq!(format_speed(2_500_000_000), "3 Gbps");
        assert_eq!(format_speed(1_400_000), "1 Mbps");
    }

    #[test]
    fn mac_is_uppercase_colon_separated() {
        assert_eq!(
            format_mac(&[0x00, 0x17, 0xc5, 0x0a, 0x0b, 0x0c]).as_deref(),
            Some("00:17:C5:0A:0B:0C")
        );
        assert_eq!(format_mac(&[]), None);
        assert_eq!(format_mac(&[1, 2, 3]), None);
    }

    #[test]
    fn snmp_record_fills_counter_block() {
        let raw = SnmpInterface {
            index: 2,
            name: "X1".into(),
            oper_status: Some(1),
            speed: Some(1_000_000_000),
            phys_address: Some(vec![0, 0x17, 0xc5, 1, 2, 3]),
            mtu: Some(1500),
            last_change: Some(4200),
            ip_address: Some(Ipv4Addr::new(203, 0, 113, 7)),
            subnet_mask: Some(Ipv4Addr::new(255, 255, 255, 0)),
            bytes_in: Some(1000),
            bytes_out: Some(500),
            packets_in: Some(10),
            packets_out: Some(5),
            errors_in: Some(0),
            errors_out: Some(0),
        };
        let status = InterfaceStatus::from(raw);

        assert_eq!(status.link_up, LinkStatus::Up);
        assert_eq!(status.link_speed.as_deref(), Some("1 Gbps"));
        assert_eq!(status.mac_address.as_deref(), Some("00:17:C5:01:02:03"));
        assert_eq!(status.zone.as_deref(), Some("WAN"));
        assert_eq!(status.ip_mode, None);
        assert_eq!(status.comment, None);
        assert_eq!(status.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(status.byte_counters(), Some((1000, 500)));
        assert_eq!(status.last_change_ticks, Some(4200));
    }

    #[test]
    fn rest_record_keeps_rest_fields_and_no_counters() {
        let raw = RestInterface {
            name: "X2".into(),
            status: Some("Down".into()),
            ip_mode: Some("DHCP".into()),
            comment: Some("Backup".into()),
            ..RestInterface::default()
        };
        let status = InterfaceStatus::from(raw);

        assert_eq!(status.link_up, LinkStatus::Down);
        assert_eq!(status.ip_mode.as_deref(), Some("DHCP"));
        assert_eq!(status.comment.as_deref(), Some("Backup"));
        assert_eq!(status.byte_counters(), None);
        assert_eq!(status.mac_address, None);
    }
}
