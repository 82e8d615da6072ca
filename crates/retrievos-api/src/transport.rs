// HTTP client construction shared by every dashboard request.
//
// One reqwest::Client per dashboard: TLS trust, request timeout and the
// session cookie jar that `/api/login` fills.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;
use reqwest::cookie::Jar;

use crate::error::Error;

const USER_AGENT: &str = concat!("retrievos/", env!("CARGO_PKG_VERSION"));

/// How server certificates are checked.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    #[default]
    System,
    /// Trust the PEM bundle at this path in addition to the system roots.
    CustomCa(PathBuf),
    /// No verification. Self-signed dashboards on a lab network.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Session cookies. Required for `login` and run control.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))
}

impl TlsMode {
    fn configure(&self, builder: ClientBuilder) -> Result<ClientBuilder, Error> {
        Ok(match self {
            Self::System => builder,
            Self::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            Self::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        })
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout);
        let builder = self.tls.configure(builder)?;
        let builder = match self.cookie_jar {
            Some(ref jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };
        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Same settings with an empty session cookie jar.
    pub fn with_cookie_jar(self) -> Self {
        Self {
            cookie_jar: Some(Arc::new(Jar::default())),
            ..self
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_ca_bundle_fails_early() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        match config.build_client() {
            Err(Error::Tls(msg)) => assert!(msg.contains("failed to read CA cert")),
            other => panic!("expected a TLS error, got {other:?}"),
        }
    }

    #[test]
    fn session_config_builds() {
        let config = TransportConfig::default().with_cookie_jar();
        assert!(config.cookie_jar.is_some());
        config.build_client().unwrap();
    }
}
