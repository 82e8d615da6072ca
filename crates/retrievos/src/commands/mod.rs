//! Command handlers, one module per command group.

pub mod batches;
pub mod config_cmd;
pub mod detail;
pub mod devices;
pub mod reference;
pub mod run;
pub mod util;

use retrievos_core::DashboardConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a dashboard command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: &DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = config.client()?;
    match cmd {
        Command::Batches => batches::list(&client, global).await,
        Command::Summaries(args) => {
            let limit = args.limit.unwrap_or(config.summaries_limit);
            batches::summaries(&client, limit, global).await
        }
        Command::Devices(args) => devices::handle(&client, args, global).await,
        Command::Cves(args) => detail::cves(&client, args, global).await,
        Command::Timeline(args) => detail::timeline(&client, &args.host, global).await,
        Command::Log(args) => detail::log(&client, args, global).await,
        Command::Mail(args) => detail::mail(&client, args, global).await,
        Command::Designation(args) => reference::designation(args.code.as_deref(), global),
        Command::Aliases => reference::aliases(&client, global).await,
        Command::Run(args) => run::handle(&client, config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
