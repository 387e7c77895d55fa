use thiserror::Error;

/// Top-level error type for the `wanwatch-api` crate.
///
/// Covers every failure mode of both acquisition surfaces: digest
/// challenge negotiation, HTTP transport, SNMP sessions, and index
/// resolution. `wanwatch-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No usable Digest challenge, or the challenge lacks `realm`/`nonce`.
    #[error("Digest challenge rejected: {message}")]
    Challenge { message: String },

    /// The digest-authenticated request was answered with a non-success status.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST ────────────────────────────────────────────────────────
    /// The reporting endpoint answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not JSON at all.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── SNMP ────────────────────────────────────────────────────────
    /// SNMP session, transport, or timeout error.
    #[error("SNMP error: {0}")]
    Snmp(#[from] Box<async_snmp::Error>),

    /// None of the wanted interfaces appeared in the interface description walk.
    #[error("No wanted interfaces found on the agent (wanted: {wanted})")]
    Resolution { wanted: String },

    /// The agent answered a batched GET with an unexpected number of bindings.
    #[error("Malformed SNMP response: {0}")]
    MalformedResponse(String),
}

impl From<async_snmp::Error> for Error {
    fn from(err: async_snmp::Error) -> Self {
        Self::Snmp(Box::new(err))
    }
}

impl Error {
    /// Returns `true` if the device rejected our credentials or challenge.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Challenge { .. })
    }

    /// Returns `true` if this is a transport-level error that a later poll
    /// may not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Snmp(_) => true,
            _ => false,
        }
    }
}
