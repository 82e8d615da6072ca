//! Per-host and per-batch detail: CVEs, timeline, log, mail.

use retrievos_api::DashboardClient;
use retrievos_core::{CveLookup, LogLine, TimelineEntry};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::cli::{BatchArgs, CvesArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

// ── CVEs ────────────────────────────────────────────────────────────

#[derive(Serialize, Tabled)]
struct CveRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "CVE")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Link")]
    link: String,
}

pub async fn cves(
    client: &DashboardClient,
    args: CvesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let batch = util::resolve_batch(client, &args.batch).await?;
    let rows = client.batch_cves(&batch).await?;

    let detail = match CveLookup::find(&rows, &args.host) {
        CveLookup::Found(detail) => detail,
        CveLookup::NoRecord { host } => {
            return Err(CliError::NotFound {
                message: format!("No record for {host} in batch {batch}"),
            });
        }
    };

    let flat: Vec<CveRow> = detail
        .groups
        .iter()
        .flat_map(|(severity, entries)| {
            entries.iter().map(move |e| CveRow {
                severity: severity.to_string(),
                id: e.id.clone(),
                title: e.title.clone(),
                link: e.link.clone().unwrap_or_default(),
            })
        })
        .collect();

    let out = output::render_list(
        global.output,
        &flat,
        |r| CveRow {
            severity: r.severity.clone(),
            id: r.id.clone(),
            title: r.title.clone(),
            link: r.link.clone(),
        },
        |r| r.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Timeline ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "Batch")]
    batch: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Desig")]
    designation: String,
    #[tabled(rename = "Upgrade")]
    upgrade: String,
    #[tabled(rename = "Crit")]
    critical: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "CPU")]
    cpu: String,
}

fn cpu_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".into(),
        Some(other) => other.to_string(),
    }
}

impl From<&TimelineEntry> for TimelineRow {
    fn from(e: &TimelineEntry) -> Self {
        let count = |v: Option<u64>| v.map_or_else(|| "-".into(), |n| n.to_string());
        Self {
            batch: e.batch_ts.clone(),
            version: or_dash(e.version.as_deref()),
            recommended: or_dash(e.recommended_version.as_deref()),
            designation: or_dash(e.release_designation.as_deref()),
            upgrade: match e.upgrade_recommended {
                Some(true) => "yes".into(),
                Some(false) => "no".into(),
                None => "-".into(),
            },
            critical: count(e.critical_cves),
            high: count(e.high_cves),
            cpu: cpu_text(e.cpu_usage.as_ref()),
        }
    }
}

pub async fn timeline(
    client: &DashboardClient,
    host: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entries = client.device_timeline(host).await?;
    let out = output::render_list(global.output, &entries, |e| TimelineRow::from(e), |e| {
        e.batch_ts.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Log / mail ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct BatchText {
    batch: String,
    text: String,
}

pub async fn log(
    client: &DashboardClient,
    args: BatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let batch = util::resolve_batch(client, &args).await?;
    let text = client.batch_log(&batch).await?;
    let lines = LogLine::parse(&text);

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let color = output::should_color(global.color)
                && global.output == OutputFormat::Table;
            lines
                .iter()
                .map(|l| {
                    if l.warning {
                        output::warn_text(&l.text, color)
                    } else {
                        l.text.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        OutputFormat::Json => output::render_json(&lines, false)?,
        OutputFormat::JsonCompact => output::render_json(&lines, true)?,
        OutputFormat::Yaml => output::render_yaml(&lines)?,
        OutputFormat::Csv => output::render_csv(&lines)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn mail(
    client: &DashboardClient,
    args: BatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let batch = util::resolve_batch(client, &args).await?;
    let text = client.batch_mail(&batch).await?;
    let view = BatchText { batch, text };
    let out = output::render_single(global.output, &view, |v| v.text.clone(), |v| v.text.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cpu_usage_accepts_numbers_and_strings() {
        assert_eq!(cpu_text(Some(&json!("12%"))), "12%");
        assert_eq!(cpu_text(Some(&json!(7.5))), "7.5");
        assert_eq!(cpu_text(Some(&Value::Null)), "-");
        assert_eq!(cpu_text(None), "-");
    }

    #[test]
    fn timeline_row_marks_missing_values() {
        let entry = TimelineEntry {
            batch_ts: "2024-01-01".into(),
            version: Some("17.9.4".into()),
            upgrade_recommended: Some(true),
            critical_cves: Some(2),
            ..TimelineEntry::default()
        };
        let row = TimelineRow::from(&entry);
        assert_eq!(row.version, "17.9.4");
        assert_eq!(row.recommended, "-");
        assert_eq!(row.upgrade, "yes");
        assert_eq!(row.critical, "2");
        assert_eq!(row.high, "-");
    }
}
