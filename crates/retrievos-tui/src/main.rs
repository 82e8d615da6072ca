//! `retrievos-tui` -- interactive dashboard for retrievos CVE batches.
//!
//! Built on [ratatui](https://ratatui.rs). All state lives in a
//! [`retrievos_core::Dashboard`]; key presses become dashboard actions and
//! the returned effects drive fetching, persistence and rendering.
//!
//! Logs are written to a file (default `/tmp/retrievos-tui.log`) so they
//! never corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod deliver;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use retrievos_config::FileStateStore;
use retrievos_core::persist::STATE_KEY;
use retrievos_core::{StateStore, TlsVerification, UiState};

use crate::app::{App, StartOptions};

/// Terminal dashboard for network device versions and CVEs.
#[derive(Parser, Debug)]
#[command(name = "retrievos-tui", version, about)]
struct Cli {
    /// Dashboard profile from the config file
    #[arg(short = 'p', long, env = "RETRIEVOS_PROFILE")]
    profile: Option<String>,

    /// Dashboard URL (overrides the profile)
    #[arg(short = 'u', long, env = "RETRIEVOS_URL")]
    url: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Shared view link (e.g. "batch=2024-01-01&host=core"); wins over saved state
    #[arg(long)]
    link: Option<String>,

    /// Request a CSV export as soon as the first batch is shown
    #[arg(long)]
    export_on_start: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/retrievos-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "retrievos_tui={log_level},retrievos_core={log_level},retrievos_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("retrievos-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the dashboard from the config file, letting flags win.
fn build_dashboard_config(
    cli: &Cli,
    cfg: &retrievos_config::Config,
) -> Result<retrievos_core::DashboardConfig> {
    let profile_name = cli
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned());

    let mut config = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            retrievos_config::profile_to_dashboard_config(profile, &profile_name, &cfg.defaults)
                .wrap_err_with(|| format!("invalid profile '{profile_name}'"))?
        }
        None if cli.profile.is_some() => {
            color_eyre::eyre::bail!("profile '{profile_name}' not found in configuration")
        }
        None => {
            let Some(ref url) = cli.url else {
                color_eyre::eyre::bail!(
                    "no dashboard configured: pass --url or run `retrievos config init`"
                );
            };
            retrievos_core::DashboardConfig {
                url: url.parse().wrap_err_with(|| format!("invalid URL: {url}"))?,
                summaries_limit: cfg.defaults.summaries_limit,
                timeout: std::time::Duration::from_secs(cfg.defaults.timeout),
                ..retrievos_core::DashboardConfig::default()
            }
        }
    };

    if let Some(ref url) = cli.url {
        config.url = url.parse().wrap_err_with(|| format!("invalid URL: {url}"))?;
    }
    if cli.insecure || cfg.defaults.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = retrievos_config::load_config_or_default();
    let config = build_dashboard_config(&cli, &cfg)?;
    let client = config.client()?;

    let store = FileStateStore::in_data_dir();
    let state = UiState::restore(store.load(STATE_KEY).as_deref(), cli.link.as_deref());

    info!(url = %config.url, batch = ?state.batch, "starting retrievos-tui");

    let options = StartOptions {
        summaries_limit: config.summaries_limit,
        export_dir: cfg.defaults.export_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        export_on_start: cli.export_on_start,
    };

    let mut app = App::new(client, Box::new(store), state, options);
    app.run().await?;

    Ok(())
}
