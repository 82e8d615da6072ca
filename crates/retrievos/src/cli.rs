//! Clap derive structures for the `retrievos` CLI.
//!
//! Only clap types live here: `build.rs` compiles this file on its own to
//! render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// retrievos -- query the network CVE dashboard from the command line
#[derive(Debug, Parser)]
#[command(
    name = "retrievos",
    version,
    about = "Query network device CVE batches from the command line",
    long_about = "Read-only access to a retrievos dashboard: batch listings, per-device\n\
        version and CVE data, pipeline logs and run status.\n\n\
        Device listings accept the same filters and sort keys as the dashboard\n\
        and can be written as CSV or JSON.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Dashboard profile to use
    #[arg(long, short = 'p', env = "RETRIEVOS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard URL (overrides profile)
    #[arg(long, short = 'u', env = "RETRIEVOS_URL", global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RETRIEVOS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RETRIEVOS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile, then 30)
    #[arg(long, env = "RETRIEVOS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Comma-separated values
    Csv,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List collection batches, most recent first
    #[command(alias = "b")]
    Batches,

    /// Per-batch summary counters
    Summaries(SummariesArgs),

    /// List devices of a batch with filters and sorting
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// CVEs for one host, grouped by severity
    Cves(CvesArgs),

    /// Version and CVE history of one host across batches
    Timeline(TimelineArgs),

    /// Pipeline log of a batch
    Log(BatchArgs),

    /// Report mail of a batch
    Mail(BatchArgs),

    /// Explain a release designation code
    Designation(DesignationArgs),

    /// Product id aliases
    Aliases,

    /// Pipeline run status and control
    Run(RunArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command arguments ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SummariesArgs {
    /// Number of batches (default: `summaries_limit` from config)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Batch id (default: most recent)
    #[arg(long, short = 'b')]
    pub batch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Host substring (case-insensitive)
    #[arg(long)]
    pub host: Option<String>,

    /// Model substring (case-insensitive)
    #[arg(long)]
    pub model: Option<String>,

    /// Recommendation substring (case-insensitive)
    #[arg(long)]
    pub rec: Option<String>,

    /// Keep devices with CVEs of these severities (repeatable)
    #[arg(long = "severity", short = 's', value_delimiter = ',')]
    pub severities: Vec<SeverityArg>,

    /// Sort column (e.g. host, model, cve_critical, cpu_usage)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct CvesArgs {
    /// Device host name
    pub host: String,

    #[command(flatten)]
    pub batch: BatchArgs,
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Device host name
    pub host: String,
}

#[derive(Debug, Args)]
pub struct DesignationArgs {
    /// Designation code (e.g. MD, GD); omit to list all
    pub code: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RunModeArg {
    /// Collect with Ansible, then analyse
    Full,
    /// Analyse the existing inventory only
    NoAnsible,
}

#[derive(Debug, Subcommand)]
pub enum RunCommand {
    /// Show whether a pipeline run is in progress
    Status,

    /// Start a pipeline run (requires login)
    Start {
        #[arg(long, short = 'm', default_value = "full")]
        mode: RunModeArg,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store the password of the active profile (or --profile) in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
