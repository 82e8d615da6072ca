//! Shared helpers for command handlers.

use retrievos_api::DashboardClient;

use crate::cli::BatchArgs;
use crate::error::CliError;

/// The requested batch, or the most recent one.
pub async fn resolve_batch(client: &DashboardClient, args: &BatchArgs) -> Result<String, CliError> {
    if let Some(ref batch) = args.batch {
        return Ok(batch.clone());
    }
    let batches = client.list_batches().await?;
    batches.into_iter().next().ok_or(CliError::NoBatches)
}

/// `-` for missing values in table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| "-".into(), str::to_owned)
}
