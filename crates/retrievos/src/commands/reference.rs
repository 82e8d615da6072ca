//! Static and slow-moving reference data: designations and pid aliases.

use retrievos_api::DashboardClient;
use retrievos_core::Designation;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DesignationRow {
    #[tabled(rename = "Code")]
    code: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
}

fn detail(d: &Designation) -> String {
    format!("{}\n\n{}", d.title, d.description)
}

pub fn designation(code: Option<&str>, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match code {
        None => output::render_list(
            global.output,
            Designation::all(),
            |d| DesignationRow {
                code: d.code,
                title: d.title,
            },
            |d| d.code.to_owned(),
        )?,
        Some(code) => {
            let found = Designation::lookup(code).ok_or_else(|| CliError::NotFound {
                message: Designation::notice(code),
            })?;
            output::render_single(global.output, found, detail, |d| d.code.to_owned())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Serialize, Tabled)]
struct AliasRow {
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Alias")]
    alias: String,
}

pub async fn aliases(client: &DashboardClient, global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<AliasRow> = client
        .pid_aliases()
        .await?
        .pid_alias
        .into_iter()
        .map(|(pid, alias)| AliasRow { pid, alias })
        .collect();
    let out = output::render_list(
        global.output,
        &rows,
        |r| AliasRow {
            pid: r.pid.clone(),
            alias: r.alias.clone(),
        },
        |r| format!("{}\t{}", r.pid, r.alias),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
