// ── Runtime monitor configuration ──
//
// These types describe *what* to poll and *how*. They carry credential
// data and timing, but never touch disk. The CLI (via wanwatch-config)
// constructs a `MonitorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use wanwatch_api::{TlsMode, TransportConfig, WantedInterfaces};

/// Which acquisition backend to use, with its connection details.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// Vendor REST API behind HTTP Digest authentication.
    Rest {
        /// API root, e.g. `https://192.168.168.168/api/sonicos`.
        url: Url,
        username: String,
        password: SecretString,
    },
    /// SNMP v2c agent.
    Snmp {
        /// `host:port`.
        target: String,
        community: SecretString,
    },
}

impl SourceConfig {
    /// Short backend name for logs and output.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Rest { .. } => "rest",
            Self::Snmp { .. } => "snmp",
        }
    }

    /// Where this source points, without credentials.
    pub fn endpoint(&self) -> String {
        match self {
            Self::Rest { url, .. } => url.to_string(),
            Self::Snmp { target, .. } => target.clone(),
        }
    }
}

/// TLS verification strategy for the REST backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed appliance certificates).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for monitoring one appliance.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub source: SourceConfig,
    pub tls: TlsVerification,
    /// Per-request timeout (both backends).
    pub timeout: Duration,
    /// SNMP retries per request after the first attempt.
    pub snmp_retries: u32,
    pub wanted: WantedInterfaces,
    /// Interval between background polls.
    pub refresh_interval: Duration,
}

impl MonitorConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_SNMP_RETRIES: u32 = 1;

    /// A config with default timing for `source` and `wanted`.
    pub fn new(source: SourceConfig, wanted: WantedInterfaces) -> Self {
        Self {
            source,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            snmp_retries: Self::DEFAULT_SNMP_RETRIES,
            wanted,
            refresh_interval: Self::DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// HTTP transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(TlsMode::from(&self.tls))
    }
}
