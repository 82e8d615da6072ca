//! CLI configuration: a thin layer over `retrievos_config` that applies
//! the global flags (--url, --insecure, --timeout) on top of a profile.

use std::time::Duration;

use retrievos_core::{DashboardConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use retrievos_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse()
        .map_err(|_| CliError::validation("url", format!("invalid URL: {raw}")))
}

/// Profile + flags → `DashboardConfig`. Flags win over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DashboardConfig, CliError> {
    let mut config = retrievos_config::profile_to_dashboard_config(profile, profile_name, defaults)?;

    if let Some(ref url) = global.url {
        config.url = parse_url(url)?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

/// Build the `DashboardConfig` for this invocation.
///
/// Uses the active profile when it exists; otherwise `--url` alone is
/// enough for anonymous read access.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    let url = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    Ok(DashboardConfig {
        url: parse_url(url)?,
        credentials: None,
        tls: if global.insecure || cfg.defaults.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
        summaries_limit: cfg.defaults.summaries_limit,
    })
}
