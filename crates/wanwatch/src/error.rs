//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use wanwatch_config::ConfigError;
use wanwatch_core::CoreError;

#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {target}")]
    #[diagnostic(
        code(wanwatch::connection_failed),
        help(
            "Check that the appliance is reachable and the method is enabled.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try: wanwatch poll --insecure"
        )
    )]
    ConnectionFailed { target: String, reason: String },

    #[error("Request to {target} timed out")]
    #[diagnostic(
        code(wanwatch::timeout),
        help("Increase the timeout with --timeout <SECONDS>, or check the network path.")
    )]
    Timeout { target: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wanwatch::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             The appliance must allow digest authentication for the REST API."
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Digest challenge unusable: {message}")]
    #[diagnostic(
        code(wanwatch::challenge),
        help("The appliance did not offer MD5 digest authentication on its auth endpoint.")
    )]
    Challenge { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(wanwatch::no_credentials),
        help(
            "REST: set WANWATCH_USERNAME and WANWATCH_PASSWORD, or username/password in the profile.\n\
             SNMP: set WANWATCH_COMMUNITY, or community in the profile.\n\
             Secrets may also live in the system keyring under service 'wanwatch'."
        )
    )]
    NoCredentials { profile: String },

    // ── Acquisition ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(wanwatch::resolution_failed),
        help("Check the --interfaces list against the appliance's interface names (e.g. X1,X2).")
    )]
    Resolution { message: String },

    #[error("Appliance returned an error: {message}")]
    #[diagnostic(code(wanwatch::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(
        code(wanwatch::config_invalid),
        help("Set it in the profile, or pass it as a flag. See: wanwatch config show")
    )]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(wanwatch::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(wanwatch::config_error))]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(wanwatch::output))]
    Output { message: String },

    #[error(transparent)]
    #[diagnostic(code(wanwatch::io))]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(wanwatch::internal))]
    Internal(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::Challenge { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::Resolution { .. }
            | Self::Api { .. }
            | Self::Output { .. }
            | Self::Io(_)
            | Self::Internal(_) => exit_code::GENERAL,
        }
    }

    /// Attach the profile name to errors that mention it.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: profile.to_owned(),
            },
            other => other,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Challenge { message } => CliError::Challenge { message },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::ConnectionFailed { target, reason } => {
                CliError::ConnectionFailed { target, reason }
            }
            CoreError::Timeout { target } => CliError::Timeout { target },
            CoreError::ResolutionFailed { message } => CliError::Resolution { message },
            CoreError::Api { message, status } => CliError::Api {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => {
                let available = wanwatch_config::load_config_or_default()
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>();
                CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                    path: wanwatch_config::config_path().display().to_string(),
                }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
