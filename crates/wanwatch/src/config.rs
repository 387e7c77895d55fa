//! CLI-side profile resolution.
//!
//! Precedence is flag (or its `WANWATCH_*` env var) > profile > defaults.
//! Flags are layered by editing the selected [`Profile`] before it is
//! translated into a `MonitorConfig`.

use wanwatch_config::{Defaults, Profile};
use wanwatch_core::MonitorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Env var consulted for the REST password when the profile names none.
pub const PASSWORD_ENV: &str = "WANWATCH_PASSWORD";

/// Env var consulted for the SNMP community when the profile names none.
pub const COMMUNITY_ENV: &str = "WANWATCH_COMMUNITY";

/// A selected profile with flag overrides applied.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
    pub defaults: Defaults,
}

/// Load the config file, pick the active profile, and apply flags.
pub fn resolve_profile(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let cfg = wanwatch_config::load_config()?;
    let (name, mut profile) = wanwatch_config::select_profile(&cfg, global.profile.as_deref())?;
    apply_overrides(&mut profile, global);
    tracing::debug!(profile = %name, method = %profile.method, "resolved profile");

    Ok(ResolvedProfile {
        name,
        profile,
        defaults: cfg.defaults,
    })
}

/// Layer global flags onto `profile`.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(method) = global.method {
        profile.method = method.as_str().into();
    }
    if let Some(ref host) = global.host {
        profile.host = Some(host.clone());
        // A host flag replaces a profile URL unless a URL flag is also given.
        if global.url.is_none() {
            profile.url = None;
        }
    }
    if let Some(ref url) = global.url {
        profile.url = Some(url.clone());
    }
    if let Some(ref interfaces) = global.interfaces {
        profile.interfaces = Some(interfaces.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if profile.password_env.is_none() {
        profile.password_env = Some(PASSWORD_ENV.into());
    }
    if profile.community_env.is_none() {
        profile.community_env = Some(COMMUNITY_ENV.into());
    }
}

/// Translate a resolved profile, optionally overriding the poll interval.
pub fn monitor_config(
    resolved: &ResolvedProfile,
    refresh_interval: Option<u64>,
) -> Result<MonitorConfig, CliError> {
    let mut profile = resolved.profile.clone();
    if refresh_interval.is_some() {
        profile.refresh_interval = refresh_interval;
    }
    Ok(wanwatch_config::profile_to_monitor_config(
        &profile,
        &resolved.name,
        &resolved.defaults,
    )?)
}
