// ── Core error types ──
//
// User-facing errors from retrievos-core. Consumers never match on HTTP
// details directly; the `From<retrievos_api::Error>` impl translates
// transport-layer errors into domain variants. The message of an HTTP
// failure is the raw response body, which is what the notice shows.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to dashboard at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Dashboard request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{message}")]
    NotFound { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("A pipeline run is already in progress")]
    RunInProgress,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<retrievos_api::Error> for CoreError {
    fn from(err: retrievos_api::Error) -> Self {
        use retrievos_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::Http {
                status: 404,
                message,
            } => CoreError::NotFound { message },
            Api::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            Api::RunInProgress => CoreError::RunInProgress,
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// HTTP status associated with the failure, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::AuthenticationFailed { .. } => Some(401),
            Self::RunInProgress => Some(409),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}
