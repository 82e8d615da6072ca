//! Device listing: the dashboard's filter and sort, from the command line.

use std::sync::Arc;

use retrievos_api::DashboardClient;
use retrievos_core::convert::device_snapshot;
use retrievos_core::export::{csv as csv_codec, json as json_export};
use retrievos_core::{Column, Device, FilterState, Severity, SeveritySet, SortState, ViewModel};
use strum::IntoEnumIterator;
use tabled::Tabled;

use crate::cli::{DevicesArgs, GlobalOpts, OutputFormat, SeverityArg};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Desig")]
    designation: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
    #[tabled(rename = "Crit")]
    critical: u32,
    #[tabled(rename = "High")]
    high: u32,
    #[tabled(rename = "Med")]
    medium: u32,
    #[tabled(rename = "Low")]
    low: u32,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        let text = |c: Column| d.column(c).as_text().into_owned();
        let counts = d.cve_counts();
        Self {
            host: d.host().to_owned(),
            model: text(Column::Model),
            version: text(Column::CurrentVersion),
            recommended: text(Column::RecommendedVersion),
            designation: text(Column::ReleaseDesignation),
            recommendation: text(Column::Recommendation),
            critical: counts.get(Severity::Critical),
            high: counts.get(Severity::High),
            medium: counts.get(Severity::Medium),
            low: counts.get(Severity::Low),
        }
    }
}

// ── Argument translation ────────────────────────────────────────────

fn severity(arg: SeverityArg) -> Severity {
    match arg {
        SeverityArg::Critical => Severity::Critical,
        SeverityArg::High => Severity::High,
        SeverityArg::Medium => Severity::Medium,
        SeverityArg::Low => Severity::Low,
    }
}

fn filter_from(args: &DevicesArgs) -> FilterState {
    FilterState {
        host: args.host.clone().unwrap_or_default(),
        model: args.model.clone().unwrap_or_default(),
        recommendation: args.rec.clone().unwrap_or_default(),
        severities: if args.severities.is_empty() {
            SeveritySet::all()
        } else {
            args.severities.iter().copied().map(severity).collect()
        },
    }
}

fn sort_from(args: &DevicesArgs) -> Result<SortState, CliError> {
    let Some(ref key) = args.sort else {
        return Ok(SortState::default());
    };
    let column: Column = key.parse().map_err(|_| {
        let known: Vec<String> = Column::iter().map(|c| c.to_string()).collect();
        CliError::validation(
            "sort",
            format!("unknown column '{key}', expected one of: {}", known.join(", ")),
        )
    })?;
    let mut sort = SortState::default();
    sort.toggle(column);
    if args.desc {
        sort.toggle(column);
    }
    Ok(sort)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &DashboardClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sort = sort_from(&args)?;

    let (records, batch) = match args.batch.batch {
        Some(ref batch) => (client.batch_devices(batch).await?, Some(batch.clone())),
        None => {
            let latest = client.latest().await?;
            (latest.devices, latest.batch_ts)
        }
    };
    tracing::debug!(batch = ?batch, count = records.len(), "devices fetched");

    let mut view = ViewModel::new();
    view.set_devices(device_snapshot(records));
    *view.filter_mut() = filter_from(&args);
    *view.sort_mut() = sort;
    let rows = view.compute_rows();

    let out = match global.output {
        OutputFormat::Table => {
            let table: Vec<DeviceRow> = rows.iter().map(DeviceRow::from).collect();
            let summary = view.summary();
            let color = output::should_color(global.color);
            format!(
                "{}\n{} {} devices, {} need upgrade, {} with critical CVEs",
                output::render_table(&table),
                output::heading(batch.as_deref().unwrap_or("latest"), color),
                summary.total,
                summary.needing_upgrade,
                summary.with_critical_cves,
            )
        }
        OutputFormat::Csv => csv_codec::to_csv(&rows)?,
        OutputFormat::Json => json_export::to_json(&rows)?,
        OutputFormat::JsonCompact => {
            let records: Vec<_> = rows.iter().map(|d| d.record()).collect();
            output::render_json(&records, true)?
        }
        OutputFormat::Yaml => {
            let records: Vec<_> = rows.iter().map(|d| d.record()).collect();
            output::render_yaml(&records)?
        }
        OutputFormat::Plain => rows
            .iter()
            .map(|d| d.host())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retrievos_core::Direction;

    use super::*;
    use crate::cli::BatchArgs;

    fn args() -> DevicesArgs {
        DevicesArgs {
            batch: BatchArgs { batch: None },
            host: None,
            model: None,
            rec: None,
            severities: Vec::new(),
            sort: None,
            desc: false,
        }
    }

    #[test]
    fn no_flags_is_the_empty_filter() {
        assert!(filter_from(&args()).is_empty());
        assert_eq!(sort_from(&args()).unwrap(), SortState::default());
    }

    #[test]
    fn severity_flags_build_the_set() {
        let a = DevicesArgs {
            severities: vec![SeverityArg::Critical, SeverityArg::Low],
            ..args()
        };
        let filter = filter_from(&a);
        assert!(filter.severities.contains(Severity::Critical));
        assert!(filter.severities.contains(Severity::Low));
        assert_eq!(filter.severities.len(), 2);
    }

    #[test]
    fn sort_key_and_direction() {
        let a = DevicesArgs {
            sort: Some("cve_critical".into()),
            desc: true,
            ..args()
        };
        assert_eq!(
            sort_from(&a).unwrap(),
            SortState::by(Column::CveCritical, Direction::Descending)
        );
    }

    #[test]
    fn unknown_sort_key_lists_columns() {
        let a = DevicesArgs {
            sort: Some("severity".into()),
            ..args()
        };
        let err = sort_from(&a).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
        assert!(err.to_string().contains("severity"));
    }
}
