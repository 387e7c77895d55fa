//! Normalisation of SNMP values into plain Rust types.
//!
//! Agents are inconsistent about counter encodings: the same object may
//! arrive as a typed counter, a signed integer, or an opaque big-endian
//! byte string. Everything numeric funnels into `u64`.

use std::net::Ipv4Addr;

use async_snmp::Value;

/// Numeric value of a counter, gauge, or integer binding.
///
/// Octet strings are read as base-256 big-endian unsigned integers.
/// Exceptions, negative integers, and values wider than 64 bits yield `None`.
pub fn counter_value(value: &Value) -> Option<u64> {
    match value {
        Value::Counter64(v) => Some(*v),
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(u64::from(*v)),
        Value::Integer(v) => u64::try_from(*v).ok(),
        Value::OctetString(bytes) | Value::Opaque(bytes) => decode_unsigned_be(bytes),
        _ => None,
    }
}

/// Interpret `bytes` as a big-endian unsigned integer.
pub fn decode_unsigned_be(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    bytes
        .iter()
        .try_fold(0u64, |acc, b| acc.checked_mul(256)?.checked_add(u64::from(*b)))
}

pub fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(i64::from(*v)),
        other => counter_value(other).and_then(|v| i64::try_from(v).ok()),
    }
}

/// Display text of an octet string, lossily decoded and trimmed.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::OctetString(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
            Some(text.to_owned())
        }
        _ => None,
    }
}

pub fn octets(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::OctetString(bytes) | Value::Opaque(bytes) => Some(bytes.to_vec()),
        _ => None,
    }
}

pub fn ipv4_value(value: &Value) -> Option<Ipv4Addr> {
    match value {
        Value::IpAddress(octets) => Some(Ipv4Addr::from(*octets)),
        Value::OctetString(bytes) => <[u8; 4]>::try_from(bytes.as_ref()).ok().map(Ipv4Addr::from),
        _ => None,
    }
}
