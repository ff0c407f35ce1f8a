//! `taskgrid status | clear | rules | priorities`.

use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;
use taskgrid_store::{Priorities, Rule};

use crate::context::Context;
use crate::exit_codes::{EXIT_IO, EXIT_PARSE};
use crate::CliError;

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// Replace the stored rules with the JSON array in FILE
    #[command(after_help = "\
Example rules.json:
  [{\"id\": \"r1\", \"type\": \"coRun\", \"params\": {\"tasks\": [\"T1\", \"T2\"]}}]")]
    Set {
        file: PathBuf,
    },
    /// Print the stored rules as JSON
    List,
}

#[derive(Subcommand, Debug)]
pub enum PrioritiesCommands {
    /// Update priority weights (unset flags keep their current value)
    Set {
        #[arg(long)]
        priority_level: Option<f64>,
        #[arg(long)]
        fairness: Option<f64>,
        #[arg(long)]
        fulfillment: Option<f64>,
    },
}

pub fn cmd_status(ctx: &Context, json_output: bool) -> Result<(), CliError> {
    let store = ctx.open_store();
    let state = store.state();
    let priorities = state.priorities();

    if json_output {
        let out = json!({
            "clients": state.clients().len(),
            "workers": state.workers().len(),
            "tasks": state.tasks().len(),
            "isDataLoaded": state.is_data_loaded(),
            "rules": state.rules().len(),
            "priorities": priorities,
            "stateFile": ctx.state_file().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError::eval(e.to_string()))?);
        return Ok(());
    }

    println!("clients:     {}", state.clients().len());
    println!("workers:     {}", state.workers().len());
    println!("tasks:       {}", state.tasks().len());
    println!("loaded:      {}", if state.is_data_loaded() { "yes" } else { "no" });
    println!("rules:       {}", state.rules().len());
    println!(
        "priorities:  PriorityLevel={} Fairness={} Fulfillment={} (total {})",
        priorities.priority_level,
        priorities.fairness,
        priorities.fulfillment,
        priorities.total()
    );
    println!("state file:  {}", ctx.state_file().display());
    Ok(())
}

pub fn cmd_clear(ctx: &Context) -> Result<(), CliError> {
    let mut store = ctx.open_store();
    store.clear();
    eprintln!("dataset cleared");
    Ok(())
}

pub fn cmd_rules(ctx: &Context, cmd: RulesCommands) -> Result<(), CliError> {
    match cmd {
        RulesCommands::Set { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| CliError::new(EXIT_IO, format!("{}: {}", file.display(), e)))?;
            let rules: Vec<Rule> = serde_json::from_str(&text)
                .map_err(|e| CliError::new(EXIT_PARSE, format!("{}: {}", file.display(), e)))?;

            let mut store = ctx.open_store();
            let count = rules.len();
            store.set_rules(rules);
            eprintln!("{count} rule(s) set");
            warn_if_unsaved(store.is_data_loaded());
            Ok(())
        }
        RulesCommands::List => {
            let store = ctx.open_store();
            let text = serde_json::to_string_pretty(store.state().rules())
                .map_err(|e| CliError::eval(e.to_string()))?;
            println!("{text}");
            Ok(())
        }
    }
}

pub fn cmd_priorities(ctx: &Context, cmd: PrioritiesCommands) -> Result<(), CliError> {
    match cmd {
        PrioritiesCommands::Set { priority_level, fairness, fulfillment } => {
            let mut store = ctx.open_store();
            let current = store.state().priorities();
            let next = Priorities {
                priority_level: priority_level.unwrap_or(current.priority_level),
                fairness: fairness.unwrap_or(current.fairness),
                fulfillment: fulfillment.unwrap_or(current.fulfillment),
            };
            for (name, v) in [
                ("priority-level", next.priority_level),
                ("fairness", next.fairness),
                ("fulfillment", next.fulfillment),
            ] {
                if !v.is_finite() {
                    return Err(CliError::args(format!("--{name} must be a finite number")));
                }
            }
            store.set_priorities(next);
            eprintln!(
                "priorities: PriorityLevel={} Fairness={} Fulfillment={}",
                next.priority_level, next.fairness, next.fulfillment
            );
            warn_if_unsaved(store.is_data_loaded());
            Ok(())
        }
    }
}

fn warn_if_unsaved(loaded: bool) {
    if !loaded {
        eprintln!("note: no complete dataset loaded; change applies to this run only");
    }
}
