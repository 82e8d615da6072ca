// ── Batch trend series ──

use retrievos_api::types::BatchSummary;

/// One point of the cross-batch trend, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub batch: String,
    pub devices_with_critical: u64,
    pub total_high: u64,
}

impl TrendPoint {
    /// Turn newest-first summaries into a chronological series.
    pub fn series(summaries: &[BatchSummary]) -> Vec<TrendPoint> {
        summaries
            .iter()
            .rev()
            .map(|s| TrendPoint {
                batch: s.batch_ts.clone(),
                devices_with_critical: s.devices_with_critical_cves,
                total_high: s.total_high_cves,
            })
            .collect()
    }
}
