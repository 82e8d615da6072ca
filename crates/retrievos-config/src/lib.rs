//! Shared configuration for the retrievos CLI and TUI.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! translation to `retrievos_core::DashboardConfig`, and the on-disk
//! store for the dashboard UI state. The CLI layers its global flags on
//! top of `profile_to_dashboard_config`.

use std::collections::HashMap;
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
use tracing::warn;

use retrievos_core::{Credentials, DashboardConfig, StateStore, TlsVerification};

/// Keyring service name shared by both binaries.
pub const KEYRING_SERVICE: &str = "retrievos";

/// Env var consulted after a profile's own `password_env`.
pub const PASSWORD_ENV: &str = "RETRIEVOS_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' has a username but no password")]
    NoPassword { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Batch summaries pulled for trend charts.
    #[serde(default = "default_summaries_limit")]
    pub summaries_limit: u32,

    /// Where exports are written. Falls back to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            summaries_limit: default_summaries_limit(),
            export_dir: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_summaries_limit() -> u32 {
    30
}

/// A named dashboard profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard base URL (e.g., "http://retrievos.lan:8000").
    pub url: String,

    /// Login for starting pipeline runs. Read-only use needs none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or an env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "retrievos", "retrievos")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "retrievos", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding persisted UI state.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "retrievos"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load config from `path` layered over defaults and `RETRIEVOS_*` env vars.
///
/// Nested keys use a double underscore: `RETRIEVOS_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RETRIEVOS_").split("__"));

    Ok(figment.extract()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default config");
        Config::default()
    })
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve the password for `profile`.
///
/// Order: the profile's `password_env`, `RETRIEVOS_PASSWORD`, the system
/// keyring, then the plaintext field.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Some(SecretString::from(val));
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Some(SecretString::from(pw));
        }
    }

    profile.password.clone().map(SecretString::from)
}

/// Login credentials, if the profile names a user.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };
    let password =
        resolve_password(profile, profile_name).ok_or_else(|| ConfigError::NoPassword {
            profile: profile_name.into(),
        })?;
    Ok(Some(Credentials { username, password }))
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DashboardConfig` from a profile and the global defaults.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DashboardConfig {
        url,
        credentials: resolve_credentials(profile, profile_name)?,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        summaries_limit: defaults.summaries_limit,
    })
}

// ── UI state on disk ────────────────────────────────────────────────

/// `StateStore` backed by one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory.
    pub fn in_data_dir() -> Self {
        Self::new(data_dir())
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write(&self, key: &str, value: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, path)
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&self, key: &str, value: &str) {
        if let Err(e) = self.write(key, value) {
            warn!(key, error = %e, "failed to persist UI state");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use retrievos_core::UiState;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"
timeout = 12

[profiles.lab]
url = "http://retrievos.lab:8000"
username = "ops"
password = "plain"

[profiles.prod]
url = "https://retrievos.example.com"
ca_cert = "/etc/ssl/retrievos.pem"
"#;

    #[test]
    fn loads_profiles_and_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.active_profile_name(), "lab");
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.timeout, 12);
            assert_eq!(cfg.defaults.summaries_limit, 30);
            assert_eq!(cfg.profiles.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("RETRIEVOS_DEFAULTS__SUMMARIES_LIMIT", "5");
            jail.set_env("RETRIEVOS_DEFAULT_PROFILE", "prod");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.summaries_limit, 5);
            assert_eq!(cfg.active_profile_name(), "prod");
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("nope.toml")).unwrap();
            assert_eq!(cfg.active_profile_name(), "default");
            assert!(cfg.profiles.is_empty());
            assert!(matches!(
                cfg.profile("default"),
                Err(ConfigError::UnknownProfile { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        figment::Jail::expect_with(|_| {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("config.toml");
            let mut cfg = Config::default();
            cfg.profiles.insert(
                "home".into(),
                Profile {
                    url: "http://10.0.0.5:8000".into(),
                    timeout: Some(5),
                    ..Profile::default()
                },
            );
            save_config_to(&cfg, &path).unwrap();

            let loaded = load_config_from(&path).unwrap();
            let home = loaded.profile("home").unwrap();
            assert_eq!(home.url, "http://10.0.0.5:8000");
            assert_eq!(home.timeout, Some(5));
            assert_eq!(home.username, None);
            Ok(())
        });
    }

    #[test]
    fn profile_password_env_wins_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RETRIEVOS_TEST_PW", "from-env");
            let profile = Profile {
                url: "http://x".into(),
                username: Some("ops".into()),
                password: Some("plain".into()),
                password_env: Some("RETRIEVOS_TEST_PW".into()),
                ..Profile::default()
            };
            let creds = resolve_credentials(&profile, "jail").unwrap().unwrap();
            assert_eq!(creds.username, "ops");
            assert_eq!(creds.password.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn no_username_means_anonymous() {
        let profile = Profile {
            url: "http://x".into(),
            password: Some("ignored".into()),
            ..Profile::default()
        };
        assert!(resolve_credentials(&profile, "anon").unwrap().is_none());
    }

    #[test]
    fn dashboard_config_tls_and_timeout() {
        let defaults = Defaults {
            timeout: 9,
            summaries_limit: 12,
            ..Defaults::default()
        };
        let profile = Profile {
            url: "https://retrievos.example.com".into(),
            ca_cert: Some("/etc/ca.pem".into()),
            ..Profile::default()
        };
        let cfg = profile_to_dashboard_config(&profile, "prod", &defaults).unwrap();
        assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/ca.pem".into()));
        assert_eq!(cfg.timeout, Duration::from_secs(9));
        assert_eq!(cfg.summaries_limit, 12);
        assert!(cfg.credentials.is_none());

        let insecure = Profile {
            insecure: Some(true),
            timeout: Some(3),
            ..profile
        };
        let cfg = profile_to_dashboard_config(&insecure, "prod", &defaults).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_url_is_validation_error() {
        let profile = Profile {
            url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_dashboard_config(&profile, "x", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
    }

    #[test]
    fn file_store_round_trips_state_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state"));
        assert_eq!(store.load("dashState"), None);

        let state = UiState {
            batch: Some("2024-03-01".into()),
            light_theme: true,
            ..UiState::default()
        };
        store.save("dashState", &state.to_blob());

        assert!(store.path_for("dashState").ends_with("state/dashState.json"));
        let restored = UiState::from_blob(store.load("dashState").as_deref());
        assert_eq!(restored.batch.as_deref(), Some("2024-03-01"));
        assert!(restored.light_theme);
    }
}
