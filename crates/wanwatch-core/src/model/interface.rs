// ── Normalized interface status ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Tri-state link classification.
///
/// `Unknown` means the upstream value could not be classified. It is
/// "no information", not a third physical state: the tracker never
/// records a transition into or out of it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkStatus {
    Up,
    Down,
    #[default]
    Unknown,
}

impl LinkStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Classify a free-form status string by substring.
    ///
    /// Containing "up" wins over containing "down"; anything else,
    /// including an absent value, is `Unknown`.
    pub fn from_text(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::Unknown;
        };
        let lower = text.to_ascii_lowercase();
        if lower.contains("up") {
            Self::Up
        } else if lower.contains("down") {
            Self::Down
        } else {
            Self::Unknown
        }
    }

    /// Map an IF-MIB `ifOperStatus` code.
    pub fn from_oper_status(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Up,
            Some(2) => Self::Down,
            _ => Self::Unknown,
        }
    }
}

/// One interface in one poll result, identical in shape for both
/// acquisition backends.
///
/// `ip_mode`, `zone`, and `comment` come from REST and are null under
/// SNMP (except `zone`, fixed to "WAN"). The counter block is SNMP-only
/// and omitted from serialized output when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStatus {
    /// Uppercased identifier, e.g. `X1`.
    pub name: String,
    pub link_up: LinkStatus,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    pub link_speed: Option<String>,
    pub ip_mode: Option<String>,
    pub zone: Option<String>,
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change_ticks: Option<u64>,
}

impl InterfaceStatus {
    /// Both octet counters, if this record carries traffic data.
    pub fn byte_counters(&self) -> Option<(u64, u64)> {
        Some((self.bytes_in?, self.bytes_out?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_classification_is_substring_based() {
        assert_eq!(LinkStatus::from_text(Some("1 Gbps Full Duplex - Up")), LinkStatus::Up);
        assert_eq!(LinkStatus::from_text(Some("UP")), LinkStatus::Up);
        assert_eq!(LinkStatus::from_text(Some("Link Down")), LinkStatus::Down);
        assert_eq!(LinkStatus::from_text(Some("No link")), LinkStatus::Unknown);
        assert_eq!(LinkStatus::from_text(Some("")), LinkStatus::Unknown);
        assert_eq!(LinkStatus::from_text(None), LinkStatus::Unknown);
    }

    #[test]
    fn oper_status_codes() {
        assert_eq!(LinkStatus::from_oper_status(Some(1)), LinkStatus::Up);
        assert_eq!(LinkStatus::from_oper_status(Some(2)), LinkStatus::Down);
        assert_eq!(LinkStatus::from_oper_status(Some(7)), LinkStatus::Unknown);
        assert_eq!(LinkStatus::from_oper_status(None), LinkStatus::Unknown);
    }

    #[test]
    fn status_parses_and_displays_lowercase() {
        assert_eq!("Up".parse::<LinkStatus>().unwrap(), LinkStatus::Up);
        assert_eq!(LinkStatus::Down.to_string(), "down");
    }

    #[test]
    fn rest_shaped_record_omits_counter_block() {
        let status = InterfaceStatus {
            name: "X1".into(),
            link_up: LinkStatus::Up,
            zone: Some("WAN".into()),
            ..InterfaceStatus::default()
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["linkUp"], json!("up"));
        assert_eq!(value["ipMode"], json!(null));
        assert!(value.get("bytesIn").is_none());
        assert!(value.get("lastChangeTicks").is_none());
    }
}
