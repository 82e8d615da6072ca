mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let profile = cli.global.profile.clone();
    if let Err(err) = run(cli).await {
        let err = with_profile(err, profile);
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Point auth help text at the profile actually in use.
fn with_profile(err: CliError, explicit: Option<String>) -> CliError {
    match err {
        CliError::AuthFailed { message, .. } => CliError::AuthFailed {
            message,
            profile: explicit.unwrap_or_else(|| {
                config::load_config_or_default()
                    .active_profile_name()
                    .to_owned()
            }),
        },
        other => other,
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a dashboard
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "retrievos", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let dashboard = config::build_dashboard_config(&cli.global)?;
            tracing::debug!(command = ?cmd, url = %dashboard.url, "dispatching command");
            commands::dispatch(cmd, &dashboard, &cli.global).await
        }
    }
}
