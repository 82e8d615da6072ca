// ── Device filter predicate ──
//
// Case-insensitive substring filters on host, model and recommendation,
// ANDed with an optional severity filter.

use serde::{Deserialize, Serialize};

use crate::model::{Device, SeveritySet};

/// Filter state for the device table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub host: String,
    pub model: String,
    pub recommendation: String,
    /// Severities a device must have CVEs in. Empty or full means "any".
    pub severities: SeveritySet,
}

impl FilterState {
    /// True when no sub-filter is active.
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
            && self.model.is_empty()
            && self.recommendation.is_empty()
            && !self.severity_active()
    }

    /// True when the severity filter actually constrains rows.
    pub fn severity_active(&self) -> bool {
        !self.severities.is_empty() && !self.severities.is_full()
    }

    pub fn matches(&self, device: &Device) -> bool {
        contains_folded(device.host(), &self.host)
            && contains_folded(&device.model(), &self.model)
            && contains_folded(&device.recommendation(), &self.recommendation)
            && (!self.severity_active() || device.cve_counts().any_in(self.severities))
    }
}

/// `matches(device, filter)` as a free function.
pub fn matches(device: &Device, filter: &FilterState) -> bool {
    filter.matches(device)
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
