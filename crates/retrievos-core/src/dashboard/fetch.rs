// ── Fetch requests and their execution ──
//
// Batch-scoped requests carry the `BatchTicket` they were issued under.
// The dashboard compares it against its current ticket on arrival and
// drops anything that no longer matches.

use retrievos_api::DashboardClient;
use retrievos_api::types::{BatchSummary, DeviceRecord, HostCves, TimelineEntry};
use tracing::debug;

use crate::error::CoreError;

/// Identity of one batch selection. `generation` increments on every
/// selection or refresh, so re-selecting the same batch still invalidates
/// responses from the earlier selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchTicket {
    pub batch: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Batches,
    Summaries { limit: u32 },
    Devices(BatchTicket),
    Cves { ticket: BatchTicket, host: String },
    Log(BatchTicket),
    Mail(BatchTicket),
    Timeline { host: String },
}

impl FetchRequest {
    /// The ticket for batch-scoped requests.
    pub fn ticket(&self) -> Option<&BatchTicket> {
        match self {
            Self::Devices(t) | Self::Log(t) | Self::Mail(t) => Some(t),
            Self::Cves { ticket, .. } => Some(ticket),
            Self::Batches | Self::Summaries { .. } | Self::Timeline { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FetchPayload {
    Batches(Vec<String>),
    Summaries(Vec<BatchSummary>),
    Devices(Vec<DeviceRecord>),
    Cves(Vec<HostCves>),
    Log(String),
    Mail(String),
    Timeline(Vec<TimelineEntry>),
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub request: FetchRequest,
    pub result: Result<FetchPayload, CoreError>,
}

/// Run one request against the API.
pub async fn execute(client: &DashboardClient, request: FetchRequest) -> FetchResponse {
    debug!(?request, "fetch");
    let result = run(client, &request).await;
    FetchResponse { request, result }
}

async fn run(client: &DashboardClient, request: &FetchRequest) -> Result<FetchPayload, CoreError> {
    Ok(match request {
        FetchRequest::Batches => FetchPayload::Batches(client.list_batches().await?),
        FetchRequest::Summaries { limit } => {
            FetchPayload::Summaries(client.batch_summaries(*limit).await?)
        }
        FetchRequest::Devices(t) => FetchPayload::Devices(client.batch_devices(&t.batch).await?),
        FetchRequest::Cves { ticket, .. } => {
            FetchPayload::Cves(client.batch_cves(&ticket.batch).await?)
        }
        FetchRequest::Log(t) => FetchPayload::Log(client.batch_log(&t.batch).await?),
        FetchRequest::Mail(t) => FetchPayload::Mail(client.batch_mail(&t.batch).await?),
        FetchRequest::Timeline { host } => {
            FetchPayload::Timeline(client.device_timeline(host).await?)
        }
    })
}
