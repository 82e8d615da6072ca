// ── Runtime connection configuration ──
//
// These types describe *how* to reach a dashboard API. They carry
// credential data and connection tuning, but never touch disk.
// The CLI/TUI builds a `DashboardConfig` and hands it in.

use std::time::Duration;

use retrievos_api::{DashboardClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Session login for endpoints that require it (starting runs).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to one dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Dashboard URL (e.g., `http://retrievos.lan:8000`).
    pub url: Url,
    /// Optional login for mutating endpoints.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// How many batch summaries to pull for the trend view.
    pub summaries_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".parse().expect("static URL is valid"),
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            summaries_limit: 30,
        }
    }
}

impl DashboardConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }

    /// Build an API client for this dashboard.
    pub fn client(&self) -> Result<DashboardClient, CoreError> {
        Ok(DashboardClient::new(self.url.as_str(), &self.transport())?)
    }

    /// Build a client and log in when credentials are configured.
    pub async fn connect(&self) -> Result<DashboardClient, CoreError> {
        let client = self.client()?;
        if let Some(creds) = &self.credentials {
            client.login(&creds.username, &creds.password).await?;
        }
        Ok(client)
    }
}
