// ── Acquisition facade ──
//
// Pure backend selection. The variant is fixed at construction from
// `SourceConfig`; `poll` dispatches to it and returns the normalized
// result unmodified. No retries, no merging of the two sources.

use tracing::debug;
use wanwatch_api::{RestClient, SnmpClient, WantedInterfaces};

use crate::config::{MonitorConfig, SourceConfig};
use crate::error::CoreError;
use crate::model::InterfaceStatus;

/// One configured acquisition backend.
pub enum Acquisition {
    Rest(RestClient),
    Snmp(SnmpClient),
}

impl Acquisition {
    /// Build the backend named by `config.source`.
    ///
    /// The REST variant gets its own HTTP client with the configured TLS
    /// mode and timeout.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, CoreError> {
        match &config.source {
            SourceConfig::Rest {
                url,
                username,
                password,
            } => {
                let client = RestClient::new(
                    url.clone(),
                    username.clone(),
                    password.clone(),
                    &config.transport(),
                )?;
                Ok(Self::Rest(client))
            }
            SourceConfig::Snmp { target, community } => {
                let client = SnmpClient::new(target.clone(), community.clone())
                    .with_timeout(config.timeout)
                    .with_retries(config.snmp_retries);
                Ok(Self::Snmp(client))
            }
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::Rest(_) => "rest",
            Self::Snmp(_) => "snmp",
        }
    }

    /// Run one acquisition.
    pub async fn poll(&self, wanted: &WantedInterfaces) -> Result<Vec<InterfaceStatus>, CoreError> {
        debug!(method = self.method(), %wanted, "acquiring interface status");
        let statuses: Vec<InterfaceStatus> = match self {
            Self::Rest(client) => client
                .fetch_interfaces(wanted)
                .await?
                .into_iter()
                .map(InterfaceStatus::from)
                .collect(),
            Self::Snmp(client) => client
                .fetch_interfaces(wanted)
                .await?
                .into_iter()
                .map(InterfaceStatus::from)
                .collect(),
        };
        Ok(statuses)
    }
}
