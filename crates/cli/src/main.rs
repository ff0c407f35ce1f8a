// taskgrid CLI - headless dataset ingestion and header reconciliation

mod assist;
mod context;
mod dataset;
mod exit_codes;
mod ingest;
mod reconcile;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use taskgrid_recon::ReconError;
use tracing_subscriber::EnvFilter;

use assist::AssistCommands;
use context::Context;
use dataset::{PrioritiesCommands, RulesCommands};
use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use ingest::EntityFiles;
use reconcile::ReconcileArgs;

#[derive(Parser)]
#[command(name = "taskgrid")]
#[command(about = "Load client/worker/task datasets and reconcile their headers")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding the persisted dataset
    #[arg(long, global = true, env = "TASKGRID_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file (default: platform config dir)
    #[arg(long, global = true, env = "TASKGRID_SETTINGS", value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load CSV files as raw entity collections
    #[command(after_help = "\
Examples:
  taskgrid ingest --clients clients.csv --workers workers.csv --tasks tasks.csv
  taskgrid ingest --tasks tasks-v2.csv")]
    Ingest {
        #[command(flatten)]
        files: EntityFiles,
    },

    /// Propose header mappings, apply overrides and commit the result
    #[command(after_help = "\
Examples:
  taskgrid reconcile --dry-run
  taskgrid reconcile --set clients:2=PriorityLevel --set clients:5=AttributesJSON
  taskgrid reconcile --rerun --json
  taskgrid reconcile --strict --config recon.toml")]
    Reconcile(ReconcileArgs),

    /// Show what is loaded
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop the loaded dataset and its persisted copy
    Clear,

    /// Business rules
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Allocation priority weights
    #[command(subcommand)]
    Priorities(PrioritiesCommands),

    /// Mapping assist configuration
    #[command(subcommand)]
    Assist(AssistCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Route `log` records from the libraries to stderr. `TASKGRID_LOG`
/// overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_env("TASKGRID_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let Some(command) = cli.command else {
        eprintln!("Usage: taskgrid <command> [options]");
        eprintln!("       taskgrid --help for more information");
        return ExitCode::from(EXIT_USAGE);
    };

    let ctx = Context::new(cli.settings.as_deref(), cli.data_dir);
    let result = match command {
        Commands::Ingest { files } => ingest::cmd_ingest(&ctx, files),
        Commands::Reconcile(args) => reconcile::cmd_reconcile(&ctx, args),
        Commands::Status { json } => dataset::cmd_status(&ctx, json),
        Commands::Clear => dataset::cmd_clear(&ctx),
        Commands::Rules(cmd) => dataset::cmd_rules(&ctx, cmd),
        Commands::Priorities(cmd) => dataset::cmd_priorities(&ctx, cmd),
        Commands::Assist(cmd) => assist::cmd_assist(&ctx, cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        Self::new(recon_exit_code(&err), err.to_string())
    }
}
