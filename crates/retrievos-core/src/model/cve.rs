// ── CVE detail for a single host ──

use retrievos_api::types::{CveItem, HostCves};
use serde::Serialize;
use strum::IntoEnumIterator;

use super::device::Severity;

const NVD_DETAIL: &str = "https://nvd.nist.gov/vuln/detail/";

/// One CVE line ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CveEntry {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
}

impl From<&CveItem> for CveEntry {
    fn from(item: &CveItem) -> Self {
        let id = item.id.trim().to_owned();
        let title = item
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| (!id.is_empty()).then(|| id.clone()))
            .unwrap_or_else(|| "untitled".into());
        let link = non_empty(item.cisco_url.as_deref())
            .or_else(|| non_empty(item.nvd_url.as_deref()))
            .map(str::to_owned)
            .or_else(|| (!id.is_empty()).then(|| nvd_link(&id)));
        Self { id, title, link }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn nvd_link(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{NVD_DETAIL}{encoded}")
}

/// A host's CVEs grouped by severity, in severity order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CveDetail {
    pub host: String,
    pub groups: Vec<(Severity, Vec<CveEntry>)>,
}

impl CveDetail {
    pub fn from_host(row: &HostCves) -> Self {
        let groups = Severity::iter()
            .map(|sev| {
                let entries: Vec<CveEntry> = row
                    .cves
                    .get(sev.as_ref())
                    .map(|items| items.iter().map(CveEntry::from).collect())
                    .unwrap_or_default();
                (sev, entries)
            })
            .collect();
        Self {
            host: row.host.clone(),
            groups,
        }
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, e)| e.len()).sum()
    }
}

/// Result of looking a host up in a batch's CVE listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CveLookup {
    Found(CveDetail),
    /// The batch has no CVE row for the host.
    NoRecord { host: String },
}

impl CveLookup {
    pub fn find(rows: &[HostCves], host: &str) -> Self {
        rows.iter()
            .find(|r| r.host == host)
            .map_or_else(
                || Self::NoRecord {
                    host: host.to_owned(),
                },
                |r| Self::Found(CveDetail::from_host(r)),
            )
    }
}
