//! Batch listing and per-batch summaries.

use retrievos_api::DashboardClient;
use retrievos_core::BatchSummary;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct BatchRow {
    #[tabled(rename = "Batch")]
    batch: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Batch")]
    batch: String,
    #[tabled(rename = "Devices")]
    devices: u64,
    #[tabled(rename = "Upgrade")]
    upgrade: u64,
    #[tabled(rename = "Critical")]
    critical: u64,
    #[tabled(rename = "EoL")]
    eol: u64,
    #[tabled(rename = "High CVEs")]
    high: u64,
    #[tabled(rename = "Medium CVEs")]
    medium: u64,
}

impl From<&BatchSummary> for SummaryRow {
    fn from(s: &BatchSummary) -> Self {
        Self {
            batch: s.batch_ts.clone(),
            devices: s.device_count,
            upgrade: s.devices_with_upgrade_recommended,
            critical: s.devices_with_critical_cves,
            eol: s.devices_eol,
            high: s.total_high_cves,
            medium: s.total_medium_cves,
        }
    }
}

pub async fn list(client: &DashboardClient, global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<BatchRow> = client
        .list_batches()
        .await?
        .into_iter()
        .map(|batch| BatchRow { batch })
        .collect();
    let out = output::render_list(
        global.output,
        &rows,
        |r| BatchRow {
            batch: r.batch.clone(),
        },
        |r| r.batch.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn summaries(
    client: &DashboardClient,
    limit: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let summaries = client.batch_summaries(limit).await?;
    let out = output::render_list(
        global.output,
        &summaries,
        |s| SummaryRow::from(s),
        |s| s.batch_ts.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
