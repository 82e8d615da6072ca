//! Pipeline run status and start.

use chrono::{DateTime, Local};
use retrievos_api::DashboardClient;
use retrievos_api::types::RunStarted;
use retrievos_core::{DashboardConfig, RunMode, RunStatus};

use crate::cli::{GlobalOpts, RunArgs, RunCommand, RunModeArg};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn format_epoch(secs: f64) -> String {
    DateTime::from_timestamp(secs.trunc() as i64, 0).map_or_else(
        || secs.to_string(),
        |t| {
            t.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

fn status_detail(s: &RunStatus) -> String {
    let mut lines = vec![
        format!("Running:  {}", if s.running { "yes" } else { "no" }),
        format!("Mode:     {}", s.mode.map_or("-", RunMode::as_str)),
        format!(
            "Started:  {}",
            s.started_at.map_or_else(|| "-".into(), format_epoch)
        ),
        format!("Last run: {}", or_dash(s.last_run_ts.as_deref())),
    ];
    if s.running && s.progress_total > 0 {
        lines.push(format!(
            "Progress: {}/{} {}",
            s.progress_current,
            s.progress_total,
            s.progress_label.as_deref().unwrap_or_default()
        ));
    }
    lines.join("\n")
}

fn started_detail(r: &RunStarted) -> String {
    let pid = r.pid.map_or_else(|| "-".into(), |p| p.to_string());
    format!("Started {} run (pid {pid})", r.mode.as_str())
}

pub async fn handle(
    client: &DashboardClient,
    config: &DashboardConfig,
    args: RunArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        RunCommand::Status => {
            let status = client.run_status().await?;
            output::render_single(global.output, &status, status_detail, |s| {
                s.running.to_string()
            })?
        }
        RunCommand::Start { mode } => {
            let mode = match mode {
                RunModeArg::Full => RunMode::Full,
                RunModeArg::NoAnsible => RunMode::NoAnsible,
            };
            // Starting a run needs a session; log in with the profile's credentials.
            let session = config.connect().await?;
            let started = session.start_run(mode).await?;
            tracing::info!(mode = mode.as_str(), pid = ?started.pid, "pipeline run started");
            output::render_single(global.output, &started, started_detail, |r| {
                r.pid.map(|p| p.to_string()).unwrap_or_default()
            })?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
