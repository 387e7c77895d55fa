// ── Raw REST records ──
//
// The vendor's interface-status report is loosely shaped: field names
// vary across firmware versions and values are sometimes numbers where
// strings are expected. Everything here is lenient; nothing errors.

use serde::Serialize;
use serde_json::Value;

/// One interface entry from the IPv4 status report, with field aliases
/// already resolved. `name` is uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestInterface {
    pub name: String,
    /// Raw link/status text (e.g. `"1 Gbps Full Duplex - Up"`).
    pub status: Option<String>,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub link_speed: Option<String>,
    pub ip_mode: Option<String>,
    pub zone: Option<String>,
    pub comment: Option<String>,
}

impl RestInterface {
    /// Build a record from one JSON object. Returns `None` when no
    /// identifier can be found.
    pub fn from_value(record: &Value) -> Option<Self> {
        let name = field(record, &["name", "interface"])?.to_ascii_uppercase();
        Some(Self {
            name,
            status: field(record, &["status", "link_status", "link"]),
            ip_address: field(record, &["ip", "ip_address"]),
            subnet_mask: field(record, &["mask", "subnet_mask", "netmask"]),
            link_speed: field(record, &["link_speed", "speed"]),
            ip_mode: field(record, &["ip_mode", "ip_assignment", "mode"]),
            zone: field(record, &["zone"]),
            comment: field(record, &["comment"]),
        })
    }
}

/// The interface records inside a status payload.
///
/// Accepts a bare array or an object with an `interfaces` array; any
/// other shape yields no records.
pub fn extract_records(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("interfaces") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

/// First non-empty value among `keys`, stringified if it is a scalar.
fn field(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
}
