// ── Device view model ──
//
// Owns one batch's raw device snapshot plus filter and sort state.
// `compute_rows` derives the visible rows and keeps that exact sequence
// as the export source until the next computation.

use std::sync::Arc;

use serde::Serialize;

use super::filter::FilterState;
use super::sort::SortState;
use crate::model::{CveCounts, Device};

/// Header counters over the raw batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub needing_upgrade: usize,
    pub with_critical_cves: usize,
}

/// Devices needing an upgrade vs. those staying on their release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeSplit {
    pub need: usize,
    pub same: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    devices: Arc<Vec<Arc<Device>>>,
    filter: FilterState,
    sort: SortState,
    last_rendered: Arc<Vec<Arc<Device>>>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Raw data ─────────────────────────────────────────────────────

    /// Replace the raw snapshot. The last rendered rows stay as they were
    /// until the next `compute_rows`.
    pub fn set_devices(&mut self, devices: Arc<Vec<Arc<Device>>>) {
        self.devices = devices;
    }

    pub fn devices(&self) -> &Arc<Vec<Arc<Device>>> {
        &self.devices
    }

    pub fn device(&self, host: &str) -> Option<&Arc<Device>> {
        self.devices.iter().find(|d| d.host() == host)
    }

    // ── Filter / sort state ──────────────────────────────────────────

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn sort_mut(&mut self) -> &mut SortState {
        &mut self.sort
    }

    // ── Derived rows ─────────────────────────────────────────────────

    /// Filter and sort the raw snapshot, retaining the result as the
    /// last rendered rows.
    pub fn compute_rows(&mut self) -> Arc<Vec<Arc<Device>>> {
        let mut rows: Vec<Arc<Device>> = self
            .devices
            .iter()
            .filter(|d| self.filter.matches(d))
            .cloned()
            .collect();
        self.sort.sort(&mut rows);

        let rows = Arc::new(rows);
        self.last_rendered = Arc::clone(&rows);
        rows
    }

    /// Exactly the rows produced by the most recent `compute_rows`.
    pub fn last_rendered(&self) -> &Arc<Vec<Arc<Device>>> {
        &self.last_rendered
    }

    // ── Aggregates over the raw batch ────────────────────────────────

    pub fn summary(&self) -> Summary {
        self.devices.iter().fold(
            Summary {
                total: self.devices.len(),
                ..Summary::default()
            },
            |mut acc, d| {
                if d.upgrade_recommended() {
                    acc.needing_upgrade += 1;
                }
                if d.cve_counts().get(crate::model::Severity::Critical) > 0 {
                    acc.with_critical_cves += 1;
                }
                acc
            },
        )
    }

    /// Sum of every severity across the batch.
    pub fn severity_totals(&self) -> CveCounts {
        self.devices.iter().fold(CveCounts::default(), |mut acc, d| {
            acc += *d.cve_counts();
            acc
        })
    }

    pub fn upgrade_split(&self) -> UpgradeSplit {
        let need = self
            .devices
            .iter()
            .filter(|d| d.upgrade_recommended())
            .count();
        UpgradeSplit {
            need,
            same: self.devices.len() - need,
        }
    }
}
