// Async HTTP client for the retrievos dashboard API.
//
// Base path: /api/
// Auth: session cookie set by POST /api/auth/login (only needed for
// starting pipeline runs; every read endpoint is public).

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types;

// ── Error response shape (FastAPI `HTTPException`) ───────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the dashboard API.
///
/// All batch-scoped calls take the batch id as issued by
/// [`list_batches`](Self::list_batches); path segments are percent-encoded.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport config.
    ///
    /// A cookie jar is always attached so that login sessions stick.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let transport = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout_secs: 30,
        })
    }

    /// Ensure the base URL ends with `/api/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(|e| self.transport(e))?;
        Self::handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        Self::handle_response(resp).await
    }

    async fn get_text(&self, segments: &[&str]) -> Result<String, Error> {
        let url = self.url(segments)?;
        debug!("GET {url} (text)");

        let resp = self.http.get(url).send().await.map_err(|e| self.transport(e))?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: detail_or_raw(&raw, status),
            };
        }

        Error::Http {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Batches ──────────────────────────────────────────────────────

    /// Batch ids, most recent first.
    pub async fn list_batches(&self) -> Result<Vec<String>, Error> {
        let list: types::BatchList = self.get(&["batches"]).await?;
        Ok(list.batches)
    }

    /// Per-batch aggregate rows, newest first.
    pub async fn batch_summaries(&self, limit: u32) -> Result<Vec<types::BatchSummary>, Error> {
        let list: types::BatchSummaries = self
            .get_with_params(&["batch_summaries"], &[("limit", limit.to_string())])
            .await?;
        Ok(list.summaries)
    }

    /// Devices of the most recent batch (empty when no batch exists).
    pub async fn latest(&self) -> Result<types::DeviceList, Error> {
        self.get(&["latest"]).await
    }

    pub async fn batch_devices(&self, batch: &str) -> Result<Vec<types::DeviceRecord>, Error> {
        let list: types::DeviceList = self.get(&["batch", batch, "devices"]).await?;
        Ok(list.devices)
    }

    pub async fn batch_cves(&self, batch: &str) -> Result<Vec<types::HostCves>, Error> {
        let list: types::CveList = self.get(&["batch", batch, "cves"]).await?;
        Ok(list.cves)
    }

    /// A host's records across all batches, oldest first.
    pub async fn device_timeline(&self, host: &str) -> Result<Vec<types::TimelineEntry>, Error> {
        let tl: types::Timeline = self.get(&["device", host, "timeline"]).await?;
        Ok(tl.timeline)
    }

    /// Pipeline log of a batch (plain text).
    pub async fn batch_log(&self, batch: &str) -> Result<String, Error> {
        self.get_text(&["batch", batch, "log"]).await
    }

    /// Notification mail sent for a batch (RFC 822 text).
    pub async fn batch_mail(&self, batch: &str) -> Result<String, Error> {
        self.get_text(&["batch", batch, "mail"]).await
    }

    pub async fn pid_aliases(&self) -> Result<types::PidAliases, Error> {
        self.get(&["pid_alias"]).await
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in; the session cookie lands in the client's jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        debug!("logging in as {username}");
        let _: serde_json::Value = self.post(&["auth", "login"], &body).await?;
        debug!("login successful");
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), Error> {
        let _: serde_json::Value = self.post(&["auth", "logout"], &json!({})).await?;
        debug!("logout complete");
        Ok(())
    }

    pub async fn me(&self) -> Result<types::Session, Error> {
        self.get(&["auth", "me"]).await
    }

    // ── Pipeline runs ────────────────────────────────────────────────

    pub async fn run_status(&self) -> Result<types::RunStatus, Error> {
        self.get(&["run", "status"]).await
    }

    /// Start a pipeline run. Requires a logged-in session.
    pub async fn start_run(&self, mode: types::RunMode) -> Result<types::RunStarted, Error> {
        match self
            .post(&["run"], &json!({ "mode": mode.as_str() }))
            .await
        {
            Err(Error::Http { status: 409, .. }) => Err(Error::RunInProgress),
            other => other,
        }
    }
}

/// Pull FastAPI's `detail` out of an error body, else the raw text.
fn detail_or_raw(raw: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorResponse>(raw) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(s),
        }) => s,
        _ if raw.is_empty() => status.to_string(),
        _ => raw.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_suffix() {
        let url = DashboardClient::normalize_base_url("http://dash.local:8000").unwrap();
        assert_eq!(url.as_str(), "http://dash.local:8000/api/");

        let url = DashboardClient::normalize_base_url("https://dash.local/retrievos/api/").unwrap();
        assert_eq!(url.as_str(), "https://dash.local/retrievos/api/");
    }

    #[test]
    fn path_segments_are_encoded() {
        let client =
            DashboardClient::with_client(reqwest::Client::new(), "http://dash.local").unwrap();
        let url = client.url(&["device", "core sw/1", "timeline"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://dash.local/api/device/core%20sw%2F1/timeline"
        );
    }

    #[test]
    fn detail_is_extracted_from_fastapi_errors() {
        let msg = detail_or_raw(
            r#"{"detail":"invalid credentials"}"#,
            reqwest::StatusCode::UNAUTHORIZED,
        );
        assert_eq!(msg, "invalid credentials");
        assert_eq!(
            detail_or_raw("", reqwest::StatusCode::UNAUTHORIZED),
            "401 Unauthorized"
        );
    }
}
