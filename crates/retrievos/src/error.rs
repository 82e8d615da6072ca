//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use retrievos_config::ConfigError;
use retrievos_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to dashboard at {url}")]
    #[diagnostic(
        code(retrievos::connection_failed),
        help(
            "Check that the dashboard is running and reachable.\n\
             Self-signed certificate? Try --insecure or set ca_cert in the profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(retrievos::timeout),
        help("Increase the timeout with --timeout or check dashboard responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(retrievos::auth_failed),
        help(
            "Verify the username in your profile and the stored password.\n\
             Run: retrievos config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Profile '{profile}' has a username but no password")]
    #[diagnostic(
        code(retrievos::no_password),
        help(
            "Store one with: retrievos config set-password --profile {profile}\n\
             Or set RETRIEVOS_PASSWORD."
        )
    )]
    NoPassword { profile: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(retrievos::not_found), help("Run: retrievos batches"))]
    NotFound { message: String },

    #[error("No batches have been collected yet")]
    #[diagnostic(
        code(retrievos::no_batches),
        help("Start a pipeline run with: retrievos run start")
    )]
    NoBatches,

    #[error("A pipeline run is already in progress")]
    #[diagnostic(code(retrievos::run_in_progress), help("Check with: retrievos run status"))]
    RunInProgress,

    #[error("{message}")]
    #[diagnostic(code(retrievos::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(retrievos::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(retrievos::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: retrievos config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No dashboard configured")]
    #[diagnostic(
        code(retrievos::no_config),
        help(
            "Create a profile with: retrievos config init\n\
             Or pass --url. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(retrievos::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV output failed: {0}")]
    #[diagnostic(help("Nested data cannot be flattened to CSV; use --output json."))]
    Csv(#[from] csv::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoPassword { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoBatches | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::NotFound { message } => Self::NotFound { message },
            CoreError::ValidationFailed { message } => Self::validation("input", message),
            CoreError::RunInProgress => Self::RunInProgress,
            CoreError::Api { message, .. } | CoreError::Internal(message) => Self::Api { message },
            CoreError::Config { message } => Self::validation("config", message),
        }
    }
}

impl From<retrievos_api::Error> for CliError {
    fn from(err: retrievos_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoPassword { profile } => Self::NoPassword { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
            (
                CoreError::AuthenticationFailed {
                    message: "bad".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::NotFound {
                    message: "Batch not found".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationFailed {
                    message: "x".into(),
                },
                exit_code::USAGE,
            ),
            (CoreError::RunInProgress, exit_code::GENERAL),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn api_message_is_shown_verbatim() {
        let err = CliError::from(CoreError::Api {
            message: "Internal Server Error".into(),
            status: Some(500),
        });
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
