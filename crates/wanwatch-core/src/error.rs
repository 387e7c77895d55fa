// ── Core error types ──
//
// User-facing errors from wanwatch-core. Consumers never match on HTTP
// status codes or SNMP PDUs directly; the `From<wanwatch_api::Error>`
// impl folds transport-layer failures into the poll-level taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Startup ──────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Digest challenge unusable: {message}")]
    Challenge { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    #[error("Request to {target} timed out")]
    Timeout { target: String },

    // ── Acquisition ──────────────────────────────────────────────────
    #[error("Interface resolution failed: {message}")]
    ResolutionFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (REST only).
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether a later poll could plausibly succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Api { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wanwatch_api::Error> for CoreError {
    fn from(err: wanwatch_api::Error) -> Self {
        match err {
            wanwatch_api::Error::Challenge { message } => CoreError::Challenge { message },
            wanwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            wanwatch_api::Error::Transport(ref e) => {
                let target = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), |u| u.as_str().to_owned());
                if e.is_timeout() {
                    CoreError::Timeout { target }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        target,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            wanwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wanwatch_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            wanwatch_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            wanwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            wanwatch_api::Error::Snmp(e) => {
                let reason = e.to_string();
                if reason.to_ascii_lowercase().contains("timeout")
                    || reason.to_ascii_lowercase().contains("timed out")
                {
                    CoreError::Timeout {
                        target: "SNMP agent".into(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        target: "SNMP agent".into(),
                        reason,
                    }
                }
            }
            wanwatch_api::Error::Resolution { wanted } => CoreError::ResolutionFailed {
                message: format!("none of [{wanted}] found in the interface description table"),
            },
            wanwatch_api::Error::MalformedResponse(message) => CoreError::Api {
                message: format!("malformed SNMP response: {message}"),
                status: None,
            },
        }
    }
}
