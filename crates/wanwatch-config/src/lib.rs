//! Configuration for the wanwatch CLI.
//!
//! TOML profiles, environment overrides, credential resolution
//! (env var + keyring + plaintext), and translation to
//! `wanwatch_core::MonitorConfig`. The CLI layers its flag overrides on
//! top by editing a [`Profile`] before calling [`profile_to_monitor_config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use wanwatch_core::{MonitorConfig, SourceConfig, TlsVerification, WantedInterfaces};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "wanwatch";

/// Path appended to a bare appliance URL or host.
pub const DEFAULT_API_PATH: &str = "api/sonicos";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between polls in `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Wanted interfaces when a profile names none.
    pub interfaces: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
            interfaces: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_refresh_interval() -> u64 {
    10
}
fn default_method() -> String {
    "rest".into()
}
fn default_snmp_port() -> u16 {
    161
}

/// A named appliance profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Acquisition method: "rest" or "snmp".
    #[serde(default = "default_method")]
    pub method: String,

    /// REST API base URL (e.g. "https://192.168.168.168/api/sonicos").
    pub url: Option<String>,

    /// Appliance host; SNMP target, or REST host when `url` is unset.
    pub host: Option<String>,

    #[serde(default = "default_snmp_port")]
    pub snmp_port: u16,

    pub username: Option<String>,

    /// REST password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the REST password.
    pub password_env: Option<String>,

    /// SNMP v2c community (plaintext; prefer keyring or env var).
    pub community: Option<String>,

    /// Environment variable name containing the community string.
    pub community_env: Option<String>,

    /// Comma-separated wanted interfaces, e.g. "X1,X2".
    pub interfaces: Option<String>,

    pub insecure: Option<bool>,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    pub timeout: Option<u64>,

    pub refresh_interval: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            method: default_method(),
            url: None,
            host: None,
            snmp_port: default_snmp_port(),
            username: None,
            password: None,
            password_env: None,
            community: None,
            community_env: None,
            interfaces: None,
            insecure: None,
            ca_cert: None,
            timeout: None,
            refresh_interval: None,
        }
    }
}

impl Profile {
    /// Copy with plaintext secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut profile = self.clone();
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.community.is_some() {
            profile.community = Some(REDACTED.into());
        }
        profile
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "wanwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wanwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered as defaults → TOML → `WANWATCH_` env.
///
/// Nested env keys use a double underscore:
/// `WANWATCH_PROFILES__HOME__URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WANWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick the profile to use.
///
/// An explicitly requested profile must exist. The implicit default may
/// be missing, in which case an empty profile is returned so flags and
/// env vars alone can drive a run.
pub fn select_profile(
    cfg: &Config,
    requested: Option<&str>,
) -> Result<(String, Profile), ConfigError> {
    if let Some(name) = requested {
        return cfg
            .profiles
            .get(name)
            .map(|p| (name.to_owned(), p.clone()))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
    }

    let name = cfg
        .default_profile
        .clone()
        .unwrap_or_else(|| "default".into());
    let profile = cfg.profiles.get(&name).cloned().unwrap_or_default();
    Ok((name, profile))
}

// ── Credential resolution ───────────────────────────────────────────

/// Look up a secret: named env var → keyring → plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    keyring_key: &str,
    plaintext: Option<&str>,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Env var named by the profile
    if let Some(env_name) = env_name {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{keyring_key}")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(secret) = plaintext {
        return Ok(SecretString::from(secret.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve REST username + password.
pub fn resolve_rest_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("WANWATCH_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = resolve_secret(
        profile.password_env.as_deref(),
        "password",
        profile.password.as_deref(),
        profile_name,
    )?;
    Ok((username, password))
}

/// Resolve the SNMP community string.
pub fn resolve_community(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.community_env.as_deref(),
        "community",
        profile.community.as_deref(),
        profile_name,
    )
}

// ── Translation to MonitorConfig ────────────────────────────────────

/// Normalize a REST base URL, appending the API path to a bare host URL.
pub fn rest_base_url(profile: &Profile) -> Result<Url, ConfigError> {
    let raw = match (&profile.url, &profile.host) {
        (Some(url), _) => url.clone(),
        (None, Some(host)) => format!("https://{host}"),
        (None, None) => return Err(invalid("url", "REST method requires 'url' or 'host'")),
    };

    let mut url: Url = raw
        .parse()
        .map_err(|e| invalid("url", format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("url", format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.path() == "/" {
        url.set_path(DEFAULT_API_PATH);
    }
    Ok(url)
}

/// `host:port` for the SNMP agent, bracketing IPv6 literals.
pub fn snmp_target(profile: &Profile) -> Result<String, ConfigError> {
    let host = match (&profile.host, &profile.url) {
        (Some(host), _) => host.clone(),
        (None, Some(url)) => url
            .parse::<Url>()
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .ok_or_else(|| invalid("host", format!("cannot derive host from '{url}'")))?,
        (None, None) => return Err(invalid("host", "SNMP method requires 'host'")),
    };

    let host = host.trim();
    if host.is_empty() {
        return Err(invalid("host", "must not be empty"));
    }
    if host.contains(':') && !host.starts_with('[') {
        Ok(format!("[{host}]:{}", profile.snmp_port))
    } else {
        Ok(format!("{host}:{}", profile.snmp_port))
    }
}

/// Build a `MonitorConfig` from a profile and the global defaults.
pub fn profile_to_monitor_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let source = match profile.method.to_ascii_lowercase().as_str() {
        "rest" => {
            let url = rest_base_url(profile)?;
            let (username, password) = resolve_rest_credentials(profile, profile_name)?;
            SourceConfig::Rest {
                url,
                username,
                password,
            }
        }
        "snmp" => SourceConfig::Snmp {
            target: snmp_target(profile)?,
            community: resolve_community(profile, profile_name)?,
        },
        other => {
            return Err(invalid(
                "method",
                format!("expected 'rest' or 'snmp', got '{other}'"),
            ));
        }
    };

    let raw_interfaces = profile
        .interfaces
        .as_deref()
        .or(defaults.interfaces.as_deref())
        .unwrap_or_default();
    let wanted = WantedInterfaces::parse_list(raw_interfaces);
    if wanted.is_empty() {
        return Err(invalid("interfaces", "at least one interface is required"));
    }

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(invalid("timeout", "must be at least 1 second"));
    }
    let refresh_interval = profile.refresh_interval.unwrap_or(defaults.refresh_interval);
    if refresh_interval == 0 {
        return Err(invalid("refresh_interval", "must be at least 1 second"));
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = MonitorConfig::new(source, wanted);
    config.tls = tls;
    config.timeout = Duration::from_secs(timeout);
    config.refresh_interval = Duration::from_secs(refresh_interval);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn rest_profile() -> Profile {
        Profile {
            url: Some("https://fw.example".into()),
            username: Some("admin".into()),
            password: Some("pw".into()),
            interfaces: Some("x1, X2".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn load_merges_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "office"

[defaults]
timeout = 3

[profiles.office]
method = "snmp"
host = "10.0.0.1"
community = "public"
interfaces = "X1"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("office"));
        assert_eq!(cfg.defaults.timeout, 3);
        assert_eq!(cfg.defaults.refresh_interval, 10);
        assert_eq!(cfg.defaults.output, "table");

        let office = &cfg.profiles["office"];
        assert_eq!(office.method, "snmp");
        assert_eq!(office.snmp_port, 161);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults, Defaults::default());
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), rest_profile());
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["home"], rest_profile());
    }

    #[test]
    fn explicit_unknown_profile_is_an_error() {
        let cfg = Config::default();
        let err = select_profile(&cfg, Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { .. }));

        let (name, profile) = select_profile(&cfg, None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn rest_profile_translates() {
        let config =
            profile_to_monitor_config(&rest_profile(), "wanwatch-test-rest", &Defaults::default())
                .unwrap();

        match &config.source {
            SourceConfig::Rest {
                url,
                username,
                password,
            } => {
                assert_eq!(url.as_str(), "https://fw.example/api/sonicos");
                assert_eq!(username, "admin");
                assert_eq!(password.expose_secret(), "pw");
            }
            SourceConfig::Snmp { .. } => panic!("expected REST source"),
        }
        assert_eq!(config.wanted.to_string(), "X1,X2");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            insecure: Some(true),
            ca_cert: Some("/etc/ssl/fw.pem".into()),
            ..rest_profile()
        };
        let config =
            profile_to_monitor_config(&profile, "wanwatch-test-tls", &Defaults::default()).unwrap();
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn snmp_target_formats_port_and_ipv6() {
        let mut profile = Profile {
            method: "snmp".into(),
            host: Some("10.0.0.1".into()),
            ..Profile::default()
        };
        assert_eq!(snmp_target(&profile).unwrap(), "10.0.0.1:161");

        profile.host = Some("fd00::1".into());
        profile.snmp_port = 1161;
        assert_eq!(snmp_target(&profile).unwrap(), "[fd00::1]:1161");

        profile.host = None;
        profile.url = Some("https://fw.example/api/sonicos".into());
        assert_eq!(snmp_target(&profile).unwrap(), "fw.example:1161");
    }

    #[test]
    fn missing_settings_are_validation_errors() {
        let no_url = Profile {
            url: None,
            ..rest_profile()
        };
        let err = profile_to_monitor_config(&no_url, "t", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));

        let no_interfaces = Profile {
            interfaces: Some(" , ".into()),
            ..rest_profile()
        };
        let err = profile_to_monitor_config(&no_interfaces, "t", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "interfaces"));

        let bad_method = Profile {
            method: "telnet".into(),
            ..rest_profile()
        };
        let err = profile_to_monitor_config(&bad_method, "t", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "method"));
    }

    #[test]
    fn defaults_supply_interfaces() {
        let profile = Profile {
            interfaces: None,
            ..rest_profile()
        };
        let defaults = Defaults {
            interfaces: Some("X3".into()),
            ..Defaults::default()
        };
        let config = profile_to_monitor_config(&profile, "wanwatch-test-defaults", &defaults).unwrap();
        assert_eq!(config.wanted.to_string(), "X3");
    }

    #[test]
    fn redaction_masks_secrets() {
        let shown = rest_profile().redacted();
        assert_eq!(shown.password.as_deref(), Some("********"));
        assert_eq!(shown.community, None);
    }
}
