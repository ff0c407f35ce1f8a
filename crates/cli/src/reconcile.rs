//! `taskgrid reconcile`: propose header mappings, apply overrides, commit.

use std::path::PathBuf;
use std::str::FromStr;

use serde_json::json;
use taskgrid_recon::{EntityType, RerunReport, ReviewSession};

use crate::context::Context;
use crate::exit_codes::{EXIT_INVALID_EDIT, EXIT_NEEDS_REVIEW};
use crate::ingest::EntityFiles;
use crate::CliError;

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    /// Override a suggestion: ENTITY:INDEX=FIELD (repeatable, 0-based index)
    #[arg(long = "set", value_name = "ENTITY:INDEX=FIELD")]
    pub sets: Vec<String>,

    /// Ask the assist again for entities whose suggestions are still off-schema
    /// (runs after --set overrides)
    #[arg(long)]
    pub rerun: bool,

    /// Show the proposal without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Refuse to commit while any header still needs review
    #[arg(long)]
    pub strict: bool,

    /// Output JSON instead of the human summary
    #[arg(long)]
    pub json: bool,

    /// Engine config (TOML): confidence_threshold, fallback_confidence,
    /// sample_size, assist_timeout_ms
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Reconcile these files instead of (or on top of) the stored dataset
    #[command(flatten)]
    pub files: EntityFiles,
}

/// One parsed `--set` override.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub entity: EntityType,
    pub index: usize,
    pub field: String,
}

impl FromStr for Override {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || {
            CliError::new(EXIT_INVALID_EDIT, format!("invalid --set '{s}'"))
                .with_hint("expected ENTITY:INDEX=FIELD, e.g. clients:2=PriorityLevel")
        };
        let (target, field) = s.split_once('=').ok_or_else(bad)?;
        let (entity, index) = target.split_once(':').ok_or_else(bad)?;
        let field = field.trim();
        if field.is_empty() {
            return Err(bad());
        }
        Ok(Self {
            entity: entity.parse()?,
            index: index.trim().parse().map_err(|_| bad())?,
            field: field.to_string(),
        })
    }
}

pub fn cmd_reconcile(ctx: &Context, args: ReconcileArgs) -> Result<(), CliError> {
    let overrides = args
        .sets
        .iter()
        .map(|s| s.parse::<Override>())
        .collect::<Result<Vec<_>, _>>()?;
    let config = ctx.recon_config(args.config.as_deref())?;

    let mut store = ctx.open_store();
    let mut collections = store.collections();
    args.files.load_into(&mut collections)?;

    let assist = ctx.assist(&config);
    let mut session = ReviewSession::resolve(&collections, &assist, &config).map_err(|e| {
        CliError::from(e).with_hint("load data with `taskgrid ingest` or pass --clients/--workers/--tasks")
    })?;

    for o in &overrides {
        session = session.edit(o.entity, o.index, &o.field)?;
    }

    let report = if args.rerun {
        let (next, report) = session.bulk_rerun(&collections, &assist, &config);
        session = next;
        Some(report)
    } else {
        None
    };

    let blocked = args.strict && session.has_issues();
    let commit = !args.dry_run && !blocked;

    if args.json {
        print_json(&session, report.as_ref(), commit);
    } else {
        print_human(&session, report.as_ref());
    }

    if blocked {
        let pending = session.needs_review().len();
        return Err(CliError::new(
            EXIT_NEEDS_REVIEW,
            format!("{pending} header(s) still need review; nothing committed"),
        )
        .with_hint("confirm them with --set ENTITY:INDEX=FIELD or drop --strict"));
    }

    if commit {
        session.commit(&collections, &mut store);
        if !args.json {
            if store.is_data_loaded() {
                eprintln!("committed to {}", ctx.state_file().display());
            } else {
                eprintln!("committed (dataset incomplete, not saved)");
            }
        }
    } else if args.dry_run && !args.json {
        eprintln!("dry run: nothing committed");
    }
    Ok(())
}

fn print_human(session: &ReviewSession, report: Option<&RerunReport>) {
    for check in session.draft() {
        let marker = if check.has_issues() { "needs review" } else { "ok" };
        println!(
            "{} ({} records): {}",
            check.entity(),
            check.record_count(),
            marker
        );
        for (i, m) in check.headers().iter().enumerate() {
            let flag = if m.is_valid { " " } else { "!" };
            println!(
                "  {flag} [{i}] {:<24} -> {:<20} {:.2}",
                m.original, m.suggested, m.confidence
            );
        }
    }

    if let Some(report) = report {
        let names = |v: &[EntityType]| {
            v.iter().map(|e| e.as_str()).collect::<Vec<_>>().join(", ")
        };
        if !report.updated.is_empty() {
            println!("rerun updated: {}", names(&report.updated[..]));
        }
        if !report.skipped.is_empty() {
            println!("rerun skipped: {}", names(&report.skipped[..]));
        }
        for (entity, err) in &report.failed {
            eprintln!("warning: rerun failed for {entity}: {err}");
        }
    }
}

fn print_json(session: &ReviewSession, report: Option<&RerunReport>, committed: bool) {
    let out = json!({
        "checks": session.draft(),
        "hasIssues": session.has_issues(),
        "rerun": report,
        "committed": committed,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: {e}"),
    }
}
