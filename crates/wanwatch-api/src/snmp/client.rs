// SNMP v2c acquisition client
//
// A poll opens one session, resolves interface names to ifIndex values
// by walking ifDescr, correlates IPv4 addresses from ipAddrTable, then
// fetches every status column for every resolved interface in a single
// batched GET. The session is dropped at the end of the poll on every
// path, success or failure.

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::time::Duration;

use async_snmp::{Auth, Client, Oid, Retry, Value, VarBind};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};

use crate::error::Error;
use crate::snmp::coerce::{counter_value, integer_value, ipv4_value, octets, text_value};
use crate::snmp::models::SnmpInterface;
use crate::snmp::oids::{
    IF_DESCR, IP_AD_ENT_ADDR, IP_AD_ENT_IF_INDEX, IP_AD_ENT_NET_MASK, StatusColumn,
};
use crate::snmp::session::SnmpSession;
use crate::wanted::WantedInterfaces;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries per request after the first attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Varbinds per PDU for a poll of `wanted`.
///
/// The session splits a GET that exceeds this, so it covers every status
/// column for every wanted interface; a name resolves to at most one
/// ifIndex, which keeps the status fetch to a single request.
fn max_oids_per_request(wanted: &WantedInterfaces) -> usize {
    StatusColumn::ALL.len() * wanted.len().max(1)
}

/// SNMP v2c client for one agent.
pub struct SnmpClient {
    target: String,
    community: SecretString,
    timeout: Duration,
    retries: u32,
}

impl SnmpClient {
    /// `target` is `host:port` (IPv6 literals in brackets).
    pub fn new(target: impl Into<String>, community: SecretString) -> Self {
        Self {
            target: target.into(),
            community,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Open a session, collect the wanted interfaces, and close it.
    pub async fn fetch_interfaces(
        &self,
        wanted: &WantedInterfaces,
    ) -> Result<Vec<SnmpInterface>, Error> {
        debug!(target = %self.target, "opening SNMP v2c session");
        let session = Client::builder(
            self.target.as_str(),
            Auth::v2c(self.community.expose_secret()),
        )
        .timeout(self.timeout)
        .retry(Retry::fixed(self.retries, Duration::ZERO))
        .max_oids_per_request(max_oids_per_request(wanted))
        .connect()
        .await?;

        collect_interfaces(&session, wanted).await
    }
}

/// An interface matched by name during the ifDescr walk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedInterface {
    index: u32,
    name: String,
}

/// Run the full acquisition against an open session.
///
/// Output follows ascending ifIndex order.
pub async fn collect_interfaces<S: SnmpSession>(
    session: &S,
    wanted: &WantedInterfaces,
) -> Result<Vec<SnmpInterface>, Error> {
    let resolved = resolve_interfaces(session, wanted).await?;
    let addresses = address_table(session).await?;
    let mut interfaces = fetch_status(session, &resolved).await?;

    for iface in &mut interfaces {
        if let Some(entry) = addresses.get(&iface.index) {
            iface.ip_address = Some(entry.address);
            iface.subnet_mask = entry.mask;
        }
    }

    debug!(count = interfaces.len(), "SNMP interfaces collected");
    Ok(interfaces)
}

/// Extract `X<digits>` from the start of an interface description.
///
/// Matching is case-insensitive; the result is uppercased.
pub fn interface_name(description: &str) -> Option<String> {
    let mut chars = description.trim_start().chars();
    let first = chars.next()?;
    if !first.eq_ignore_ascii_case(&'x') {
        return None;
    }
    let digits: String = chars.take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("X{digits}"))
}

// ── Name resolution ─────────────────────────────────────────────────

async fn resolve_interfaces<S: SnmpSession>(
    session: &S,
    wanted: &WantedInterfaces,
) -> Result<Vec<ResolvedInterface>, Error> {
    let root = Oid::from_slice(IF_DESCR);
    let rows = session.walk(&root).await?;
    trace!(rows = rows.len(), "ifDescr walked");

    let mut by_name: BTreeMap<String, u32> = BTreeMap::new();
    for vb in &rows {
        let Some(index) = table_index(&vb.oid, &root) else {
            continue;
        };
        let Some(name) = text_value(&vb.value).as_deref().and_then(interface_name) else {
            continue;
        };
        if !wanted.contains(&name) {
            continue;
        }
        by_name
            .entry(name)
            .and_modify(|existing| *existing = (*existing).min(index))
            .or_insert(index);
    }

    if by_name.is_empty() {
        return Err(Error::Resolution {
            wanted: wanted.to_string(),
        });
    }

    let mut resolved: Vec<ResolvedInterface> = by_name
        .into_iter()
        .map(|(name, index)| ResolvedInterface { index, name })
        .collect();
    resolved.sort_by_key(|r| r.index);
    debug!(?resolved, "interfaces resolved");
    Ok(resolved)
}

/// The single trailing arc of a table row OID under `root`.
fn table_index(oid: &Oid, root: &Oid) -> Option<u32> {
    match oid.arcs().strip_prefix(root.arcs())? {
        [index] => Some(*index),
        _ => None,
    }
}

// ── Address correlation ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct AddressEntry {
    address: Ipv4Addr,
    mask: Option<Ipv4Addr>,
}

/// Map ifIndex to its IPv4 address and mask.
///
/// Rows of the three ipAddrTable columns are joined on their shared OID
/// suffix (the four address arcs), never on walk position. When an
/// interface carries several addresses the lowest one wins.
async fn address_table<S: SnmpSession>(session: &S) -> Result<HashMap<u32, AddressEntry>, Error> {
    let addr_root = Oid::from_slice(IP_AD_ENT_ADDR);
    let index_root = Oid::from_slice(IP_AD_ENT_IF_INDEX);
    let mask_root = Oid::from_slice(IP_AD_ENT_NET_MASK);

    let addresses = by_suffix(session.walk(&addr_root).await?, &addr_root);
    let if_indices = by_suffix(session.walk(&index_root).await?, &index_root);
    let masks = by_suffix(session.walk(&mask_root).await?, &mask_root);

    let mut table = HashMap::new();
    for (suffix, value) in &if_indices {
        let Some(if_index) = counter_value(value).and_then(|v| u32::try_from(v).ok()) else {
            continue;
        };
        let address = addresses
            .get(suffix)
            .and_then(ipv4_value)
            .or_else(|| address_from_suffix(suffix));
        let Some(address) = address else {
            continue;
        };
        let mask = masks.get(suffix).and_then(ipv4_value);
        table
            .entry(if_index)
            .or_insert(AddressEntry { address, mask });
    }

    trace!(entries = table.len(), "ipAddrTable correlated");
    Ok(table)
}

fn by_suffix(rows: Vec<VarBind>, root: &Oid) -> BTreeMap<Vec<u32>, Value> {
    rows.into_iter()
        .filter_map(|vb| {
            let suffix = vb.oid.arcs().strip_prefix(root.arcs())?.to_vec();
            Some((suffix, vb.value))
        })
        .collect()
}

fn address_from_suffix(suffix: &[u32]) -> Option<Ipv4Addr> {
    let [a, b, c, d] = suffix else {
        return None;
    };
    Some(Ipv4Addr::new(
        u8::try_from(*a).ok()?,
        u8::try_from(*b).ok()?,
        u8::try_from(*c).ok()?,
        u8::try_from(*d).ok()?,
    ))
}

// ── Status fetch ────────────────────────────────────────────────────

async fn fetch_status<S: SnmpSession>(
    session: &S,
    resolved: &[ResolvedInterface],
) -> Result<Vec<SnmpInterface>, Error> {
    if resolved.is_empty() {
        return Ok(Vec::new());
    }

    // Column-major: all interfaces for column 0, then column 1, ...
    let requested: Vec<Oid> = StatusColumn::ALL
        .iter()
        .flat_map(|column| resolved.iter().map(|r| column.instance(r.index)))
        .collect();

    let bindings = session.get_many(&requested).await?;
    if bindings.len() != requested.len() {
        return Err(Error::MalformedResponse(format!(
            "expected {} bindings, got {}",
            requested.len(),
            bindings.len()
        )));
    }

    let cells: Vec<Option<&Value>> = requested
        .iter()
        .zip(&bindings)
        .map(|(oid, vb)| (vb.oid == *oid && !is_exception(&vb.value)).then_some(&vb.value))
        .collect();
    let columns: Vec<&[Option<&Value>]> = cells.chunks(resolved.len()).collect();

    let [
        oper,
        speed,
        phys,
        mtu,
        last_change,
        in_octets,
        out_octets,
        in_ucast,
        out_ucast,
        in_errors,
        out_errors,
    ] = columns.as_slice()
    else {
        return Err(Error::MalformedResponse(format!(
            "expected {} columns, got {}",
            StatusColumn::ALL.len(),
            columns.len()
        )));
    };

    let interfaces = resolved
        .iter()
        .enumerate()
        .map(|(pos, r)| SnmpInterface {
            index: r.index,
            name: r.name.clone(),
            oper_status: cell(oper, pos).and_then(integer_value),
            speed: cell(speed, pos).and_then(counter_value),
            phys_address: cell(phys, pos).and_then(octets),
            mtu: cell(mtu, pos).and_then(counter_value),
            last_change: cell(last_change, pos).and_then(counter_value),
            ip_address: None,
            subnet_mask: None,
            bytes_in: cell(in_octets, pos).and_then(counter_value),
            bytes_out: cell(out_octets, pos).and_then(counter_value),
            packets_in: cell(in_ucast, pos).and_then(counter_value),
            packets_out: cell(out_ucast, pos).and_then(counter_value),
            errors_in: cell(in_errors, pos).and_then(counter_value),
            errors_out: cell(out_errors, pos).and_then(counter_value),
        })
        .collect();

    Ok(interfaces)
}

fn cell<'v>(column: &[Option<&'v Value>], pos: usize) -> Option<&'v Value> {
    column.get(pos).copied().flatten()
}

fn is_exception(value: &Value) -> bool {
    matches!(
        value,
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// In-memory agent: a sorted OID → value table.
    #[derive(Default)]
    struct FakeAgent {
        objects: BTreeMap<Oid, Value>,
        truncate_get: bool,
        /// OID count of every GET received.
        gets: Mutex<Vec<usize>>,
    }

    impl FakeAgent {
        fn set(&mut self, base: &[u32], suffix: &[u32], value: Value) {
            let mut arcs = base.to_vec();
            arcs.extend_from_slice(suffix);
            self.objects.insert(Oid::from_slice(&arcs), value);
        }

        fn set_column(&mut self, column: StatusColumn, index: u32, value: Value) {
            self.set(column.arcs(), &[index], value);
        }
    }

    impl SnmpSession for FakeAgent {
        async fn walk(&self, root: &Oid) -> Result<Vec<VarBind>, Error> {
            Ok(self
                .objects
                .iter()
                .filter(|(oid, _)| oid.starts_with(root) && *oid != root)
                .map(|(oid, value)| VarBind {
                    oid: oid.clone(),
                    value: value.clone(),
                })
                .collect())
        }

        async fn get_many(&self, oids: &[Oid]) -> Result<Vec<VarBind>, Error> {
            self.gets.lock().unwrap().push(oids.len());
            let mut out: Vec<VarBind> = oids
                .iter()
                .map(|oid| VarBind {
                    oid: oid.clone(),
                    value: self
                        .objects
                        .get(oid)
                        .cloned()
                        .unwrap_or(Value::NoSuchInstance),
                })
                .collect();
            if self.truncate_get {
                out.pop();
            }
            Ok(out)
        }
    }

    fn wanted(list: &str) -> WantedInterfaces {
        WantedInterfaces::parse_list(list)
    }

    fn agent_with_two_wans() -> FakeAgent {
        let mut agent = FakeAgent::default();
        agent.set(IF_DESCR, &[1], Value::from("X0 LAN"));
        agent.set(IF_DESCR, &[2], Value::from("X1 WAN Primary"));
        agent.set(IF_DESCR, &[3], Value::from("x2"));
        agent.set(IF_DESCR, &[4], Value::from("X10 DMZ"));

        for (index, oper, bytes) in [(2u32, 1, 1_000u64), (3, 2, 0)] {
            agent.set_column(StatusColumn::OperStatus, index, Value::Integer(oper));
            agent.set_column(StatusColumn::Speed, index, Value::Gauge32(1_000_000_000));
            agent.set_column(
                StatusColumn::PhysAddress,
                index,
                Value::from(&[0x00u8, 0x17, 0xc5, 0x0a, 0x0b, 0x0c][..]),
            );
            agent.set_column(StatusColumn::Mtu, index, Value::Integer(1500));
            agent.set_column(StatusColumn::LastChange, index, Value::TimeTicks(4200));
            agent.set_column(StatusColumn::HcInOctets, index, Value::Counter64(bytes));
            agent.set_column(StatusColumn::HcOutOctets, index, Value::Counter64(bytes / 2));
            agent.set_column(StatusColumn::HcInUcastPkts, index, Value::Counter64(10));
            agent.set_column(StatusColumn::HcOutUcastPkts, index, Value::Counter64(5));
            agent.set_column(StatusColumn::InErrors, index, Value::Counter32(0));
            agent.set_column(StatusColumn::OutErrors, index, Value::Counter32(1));
        }
        agent
    }

    #[test]
    fn name_prefix_extraction() {
        assert_eq!(interface_name("X1 WAN").as_deref(), Some("X1"));
        assert_eq!(interface_name("x12").as_deref(), Some("X12"));
        assert_eq!(interface_name("  X3:V10").as_deref(), Some("X3"));
        assert_eq!(interface_name("X WAN"), None);
        assert_eq!(interface_name("eth0"), None);
        assert_eq!(interface_name(""), None);
    }

    #[tokio::test]
    async fn collects_wanted_interfaces_in_index_order() {
        let agent = agent_with_two_wans();
        let rows = collect_interfaces(&agent, &wanted("X2,X1")).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "X1");
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[0].oper_status, Some(1));
        assert_eq!(rows[0].speed, Some(1_000_000_000));
        assert_eq!(rows[0].mtu, Some(1500));
        assert_eq!(rows[0].last_change, Some(4200));
        assert_eq!(rows[0].bytes_in, Some(1_000));
        assert_eq!(rows[0].bytes_out, Some(500));
        assert_eq!(rows[0].errors_out, Some(1));
        assert_eq!(
            rows[0].phys_address.as_deref(),
            Some(&[0x00u8, 0x17, 0xc5, 0x0a, 0x0b, 0x0c][..])
        );

        assert_eq!(rows[1].name, "X2");
        assert_eq!(rows[1].oper_status, Some(2));
    }

    #[tokio::test]
    async fn six_wans_fit_one_status_request() {
        let mut agent = FakeAgent::default();
        for index in 1..=6u32 {
            agent.set(IF_DESCR, &[index], Value::from(format!("X{index} WAN").as_str()));
            for column in StatusColumn::ALL {
                agent.set_column(column, index, Value::Counter32(index));
            }
        }
        let wanted = wanted("X1,X2,X3,X4,X5,X6");

        let rows = collect_interfaces(&agent, &wanted).await.unwrap();
        assert_eq!(rows.len(), 6);

        let gets = agent.gets.lock().unwrap().clone();
        assert_eq!(gets, vec![StatusColumn::ALL.len() * 6]);
        assert!(gets[0] <= max_oids_per_request(&wanted));
    }

    #[test]
    fn request_cap_grows_with_wanted_count() {
        assert_eq!(max_oids_per_request(&wanted("X1")), StatusColumn::ALL.len());
        assert_eq!(max_oids_per_request(&wanted("X1,X2,X3,X4,X5,X6,X7,X8")), 88);
        assert_eq!(max_oids_per_request(&wanted("")), StatusColumn::ALL.len());
    }

    #[tokio::test]
    async fn x1_does_not_match_x10() {
        let agent = agent_with_two_wans();
        let rows = collect_interfaces(&agent, &wanted("X1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 2);
    }

    #[tokio::test]
    async fn no_matching_description_is_a_resolution_error() {
        let agent = agent_with_two_wans();
        let err = collect_interfaces(&agent, &wanted("X7")).await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }), "{err}");
    }

    #[tokio::test]
    async fn duplicate_descriptions_keep_lowest_index() {
        let mut agent = agent_with_two_wans();
        agent.set(IF_DESCR, &[9], Value::from("X1 alias"));
        let rows = collect_interfaces(&agent, &wanted("X1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 2);
    }

    #[tokio::test]
    async fn addresses_correlate_by_suffix_not_position() {
        let mut agent = agent_with_two_wans();
        // Index column lists the addresses in a different order than the
        // mask column would if read positionally.
        agent.set(IP_AD_ENT_ADDR, &[10, 0, 0, 1], Value::IpAddress([10, 0, 0, 1]));
        agent.set(IP_AD_ENT_ADDR, &[203, 0, 113, 7], Value::IpAddress([203, 0, 113, 7]));
        agent.set(IP_AD_ENT_IF_INDEX, &[10, 0, 0, 1], Value::Integer(1));
        agent.set(IP_AD_ENT_IF_INDEX, &[203, 0, 113, 7], Value::Integer(2));
        agent.set(IP_AD_ENT_NET_MASK, &[203, 0, 113, 7], Value::IpAddress([255, 255, 255, 248]));

        let rows = collect_interfaces(&agent, &wanted("X1,X2")).await.unwrap();
        assert_eq!(rows[0].ip_address, Some(Ipv4Addr::new(203, 0, 113, 7)));
        assert_eq!(rows[0].subnet_mask, Some(Ipv4Addr::new(255, 255, 255, 248)));
        assert_eq!(rows[1].ip_address, None);
        assert_eq!(rows[1].subnet_mask, None);
    }

    #[tokio::test]
    async fn missing_address_column_falls_back_to_suffix() {
        let mut agent = agent_with_two_wans();
        agent.set(IP_AD_ENT_IF_INDEX, &[198, 51, 100, 2], Value::Integer(3));
        let rows = collect_interfaces(&agent, &wanted("X2")).await.unwrap();
        assert_eq!(rows[0].ip_address, Some(Ipv4Addr::new(198, 51, 100, 2)));
        assert_eq!(rows[0].subnet_mask, None);
    }

    #[tokio::test]
    async fn exception_values_become_absent() {
        let mut agent = agent_with_two_wans();
        agent
            .objects
            .remove(&StatusColumn::HcInOctets.instance(2));
        let rows = collect_interfaces(&agent, &wanted("X1")).await.unwrap();
        assert_eq!(rows[0].bytes_in, None);
        assert_eq!(rows[0].bytes_out, Some(500));
    }

    #[tokio::test]
    async fn short_get_response_is_malformed() {
        let mut agent = agent_with_two_wans();
        agent.truncate_get = true;
        let err = collect_interfaces(&agent, &wanted("X1")).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)), "{err}");
    }
}
