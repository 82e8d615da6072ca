// Wire types for the retrievos dashboard API.
//
// Device rows are kept as raw JSON objects: the dashboard exports them
// verbatim, so nothing may be dropped or reordered on the way through.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A device row exactly as the server sent it.
pub type DeviceRecord = Map<String, Value>;

// ── Batches ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchList {
    #[serde(default)]
    pub batches: Vec<String>,
}

/// One row of `/api/batch_summaries`, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_ts: String,
    #[serde(default)]
    pub device_count: u64,
    #[serde(default)]
    pub devices_with_upgrade_recommended: u64,
    #[serde(default)]
    pub devices_with_critical_cves: u64,
    #[serde(default)]
    pub devices_eol: u64,
    #[serde(default)]
    pub total_high_cves: u64,
    #[serde(default)]
    pub total_medium_cves: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchSummaries {
    #[serde(default)]
    pub summaries: Vec<BatchSummary>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub batch_ts: Option<String>,
}

// ── CVEs ─────────────────────────────────────────────────────────────

/// A single CVE reference. The server fills in missing URLs, but older
/// snapshots may carry bare ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CveItemRepr")]
pub struct CveItem {
    pub id: String,
    pub title: Option<String>,
    pub cisco_url: Option<String>,
    pub nvd_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CveItemRepr {
    Bare(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        cisco_url: Option<String>,
        #[serde(default)]
        nvd_url: Option<String>,
    },
}

impl From<CveItemRepr> for CveItem {
    fn from(repr: CveItemRepr) -> Self {
        match repr {
            CveItemRepr::Bare(id) => Self {
                id: id.trim().to_owned(),
                ..Self::default()
            },
            CveItemRepr::Full {
                id,
                title,
                cisco_url,
                nvd_url,
            } => Self {
                id: id.unwrap_or_default().trim().to_owned(),
                title,
                cisco_url,
                nvd_url,
            },
        }
    }
}

/// Per-host CVE listing, keyed by severity name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostCves {
    pub host: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cves: IndexMap<String, Vec<CveItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CveList {
    #[serde(default)]
    pub cves: Vec<HostCves>,
}

// ── Timeline ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub batch_ts: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub recommended_version: Option<String>,
    #[serde(default)]
    pub release_designation: Option<String>,
    #[serde(default)]
    pub upgrade_recommended: Option<bool>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub critical_cves: Option<u64>,
    #[serde(default)]
    pub high_cves: Option<u64>,
    #[serde(default)]
    pub cpu_usage: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub series_release_date: Option<String>,
    #[serde(default)]
    pub end_of_sale_date: Option<String>,
    #[serde(default)]
    pub end_of_support_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

// ── Pipeline runs ────────────────────────────────────────────────────

/// Which orchestration script `/api/run` launches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    #[default]
    Full,
    NoAnsible,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::NoAnsible => "no-ansible",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub mode: Option<RunMode>,
    #[serde(default)]
    pub started_at: Option<f64>,
    #[serde(default)]
    pub last_run_ts: Option<String>,
    #[serde(default)]
    pub orch_tail: Option<String>,
    #[serde(default)]
    pub progress_current: u32,
    #[serde(default)]
    pub progress_total: u32,
    #[serde(default)]
    pub progress_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStarted {
    #[serde(default)]
    pub started: bool,
    pub mode: RunMode,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub started_at: Option<f64>,
}

// ── PID aliases ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PidAliases {
    #[serde(default)]
    pub pid_alias: IndexMap<String, String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cve_item_accepts_bare_id() {
        let item: CveItem = serde_json::from_value(json!(" CVE-2024-0001 ")).unwrap();
        assert_eq!(item.id, "CVE-2024-0001");
        assert!(item.nvd_url.is_none());
    }

    #[test]
    fn host_cves_tolerates_null_map() {
        let row: HostCves = serde_json::from_value(json!({"host": "sw1", "cves": null})).unwrap();
        assert!(row.cves.is_empty());
    }

    #[test]
    fn run_mode_uses_kebab_case() {
        let mode: RunMode = serde_json::from_value(json!("no-ansible")).unwrap();
        assert_eq!(mode, RunMode::NoAnsible);
        assert_eq!(mode.as_str(), "no-ansible");
    }
}
