//! `taskgrid assist doctor`.

use clap::Subcommand;
use serde_json::json;
use taskgrid_config::{AssistConfigStatus, AssistDiagnostics, ResolvedAssistConfig, Settings};

use crate::context::Context;
use crate::exit_codes::{EXIT_ASSIST_DISABLED, EXIT_ASSIST_MISSING_KEY};
use crate::CliError;

#[derive(Subcommand, Debug)]
pub enum AssistCommands {
    /// Check assist configuration and key resolution (no network)
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_assist(ctx: &Context, cmd: AssistCommands) -> Result<(), CliError> {
    match cmd {
        AssistCommands::Doctor { json } => cmd_assist_doctor(ctx, json),
    }
}

fn cmd_assist_doctor(ctx: &Context, json_output: bool) -> Result<(), CliError> {
    let resolved = ResolvedAssistConfig::from_settings(&ctx.settings.assist);
    let diag = AssistDiagnostics::from_resolved(&resolved);

    if json_output {
        let out = json!({
            "provider": diag.provider,
            "status": diag.status.as_str(),
            "model": diag.model,
            "endpoint": diag.endpoint,
            "timeout_ms": diag.timeout_ms,
            "sample_size": diag.sample_size,
            "key_present": diag.key_present,
            "key_source": diag.key_source.as_str(),
            "keychain_available": diag.keychain_available,
            "blocking_reason": diag.blocking_reason,
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError::eval(e.to_string()))?);
    } else {
        print!("{diag}");
        if diag.status == AssistConfigStatus::Disabled {
            println!();
            println!("Assist is disabled. To enable:");
            println!("  Set assist.provider in {}", Settings::config_path_display());
        }
    }

    match diag.status {
        AssistConfigStatus::Ready => Ok(()),
        AssistConfigStatus::Disabled => Err(CliError::new(EXIT_ASSIST_DISABLED, "assist is disabled")),
        AssistConfigStatus::MissingKey => Err(CliError::new(
            EXIT_ASSIST_MISSING_KEY,
            diag.blocking_reason.unwrap_or_else(|| "missing API key".to_string()),
        )),
    }
}
