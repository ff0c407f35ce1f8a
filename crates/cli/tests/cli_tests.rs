// Integration tests for the `taskgrid` binary.
// Run with: cargo test -p taskgrid-cli --test cli_tests -- --nocapture
//
// Every test gets its own data dir and settings file; nothing touches the
// network (the default assist is the local heuristic).

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn taskgrid(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskgrid"));
        cmd.env("TASKGRID_DATA_DIR", self.path("data"))
            .env("TASKGRID_SETTINGS", self.path("settings.json"))
            .env_remove("TASKGRID_OPENAI_KEY")
            .env_remove("TASKGRID_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.taskgrid().args(args).output().expect("spawn taskgrid")
    }

    fn state_file(&self) -> PathBuf {
        self.path("data").join("dataset-state.json")
    }

    fn state(&self) -> Value {
        let text = std::fs::read_to_string(self.state_file()).expect("state file");
        serde_json::from_str(&text).expect("valid state JSON")
    }

    fn ingest_fixtures(&self) -> Output {
        let clients = self.write(
            "clients.csv",
            "Client ID,Client Name,Priority,Tasks,Group,Attrs\n\
             C1,Acme,3,\"T1,T2\",GA,{}\n\
             C2,Globex,5,T3,GB,{}\n",
        );
        let workers = self.write(
            "workers.csv",
            "WorkerID,WorkerName,Skills,AvailableSlots,MaxLoadPerPhase,WorkerGroup,QualificationLevel\n\
             W1,Ann,py,[1],2,GA,3\n",
        );
        let tasks = self.write(
            "tasks.csv",
            "TaskID,TaskName,Category,Duration,RequiredSkills,PreferredPhases,MaxConcurrent\n\
             T1,Build,eng,2,py,[1],1\n",
        );
        self.run(&[
            "ingest",
            "--clients", to_str(&clients),
            "--workers", to_str(&workers),
            "--tasks", to_str(&tasks),
        ])
    }
}

fn to_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn stdout_json(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// No data
// ---------------------------------------------------------------------------

#[test]
fn reconcile_without_data_exits_no_dataset() {
    let sb = Sandbox::new();
    let out = sb.run(&["reconcile"]);
    assert_eq!(out.status.code(), Some(20), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("no dataset loaded"));
    assert!(stderr(&out).contains("hint:"));
}

#[test]
fn ingest_without_files_is_usage_error() {
    let sb = Sandbox::new();
    let out = sb.run(&["ingest"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn partial_ingest_is_not_persisted() {
    let sb = Sandbox::new();
    let clients = sb.write("c.csv", "ClientID\nC1\n");
    let out = sb.run(&["ingest", "--clients", to_str(&clients)]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("not saved"));
    assert!(!sb.state_file().exists());
}

#[test]
fn duplicate_csv_headers_are_parse_error() {
    let sb = Sandbox::new();
    let clients = sb.write("c.csv", "ClientID,ClientID\nC1,C2\n");
    let out = sb.run(&["ingest", "--clients", to_str(&clients)]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("duplicate column header 'ClientID'"));
}

// ---------------------------------------------------------------------------
// Ingest → reconcile → status
// ---------------------------------------------------------------------------

#[test]
fn ingest_then_reconcile_commits_canonical_headers() {
    let sb = Sandbox::new();
    let out = sb.ingest_fixtures();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(sb.state()["isDataLoaded"], true);
    assert_eq!(sb.state()["clients"][0]["Client ID"], "C1");

    let out = sb.run(&["reconcile", "--dry-run", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report = stdout_json(&out);
    assert_eq!(report["committed"], false);
    assert_eq!(report["checks"].as_array().unwrap().len(), 3);
    assert_eq!(report["checks"][0]["entity"], "clients");
    // Dry run leaves raw headers in place.
    assert_eq!(sb.state()["clients"][0]["Client ID"], "C1");

    let out = sb.run(&["reconcile"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let state = sb.state();
    assert_eq!(state["clients"][0]["ClientID"], "C1");
    assert_eq!(state["clients"][1]["PriorityLevel"], 5);
    assert_eq!(state["clients"][0]["RequestedTaskIDs"], "T1,T2");
    assert_eq!(state["workers"][0]["WorkerID"], "W1");

    let out = sb.run(&["status", "--json"]);
    let status = stdout_json(&out);
    assert_eq!(status["clients"], 2);
    assert_eq!(status["isDataLoaded"], true);
    assert_eq!(status["priorities"]["PriorityLevel"], 40.0);
}

#[test]
fn strict_reconcile_refuses_unreviewed_headers() {
    let sb = Sandbox::new();
    sb.write("settings.json", r#"{ "assist": { "provider": "none" } }"#);
    assert!(sb.ingest_fixtures().status.success());

    let out = sb.run(&["reconcile", "--strict"]);
    assert_eq!(out.status.code(), Some(21), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("need review"));
    assert_eq!(sb.state()["clients"][0]["Client ID"], "C1");

    // Confirm every positional guess, then strict commit goes through.
    let fields = [
        "ClientID", "ClientName", "PriorityLevel", "RequestedTaskIDs", "GroupTag", "AttributesJSON",
    ];
    let sets: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("clients:{i}={f}"))
        .collect();
    let mut args = vec!["reconcile", "--strict"];
    for s in &sets {
        args.push("--set");
        args.push(s);
    }
    let out = sb.run(&args);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(sb.state()["clients"][0]["AttributesJSON"], "{}");
}

#[test]
fn out_of_range_override_is_rejected() {
    let sb = Sandbox::new();
    assert!(sb.ingest_fixtures().status.success());
    let out = sb.run(&["reconcile", "--set", "clients:99=ClientID"]);
    assert_eq!(out.status.code(), Some(22));
    assert!(stderr(&out).contains("out of range"));
}

#[test]
fn invalid_recon_config_is_rejected() {
    let sb = Sandbox::new();
    assert!(sb.ingest_fixtures().status.success());
    let config = sb.write("recon.toml", "confidence_threshold = 1.5\n");
    let out = sb.run(&["reconcile", "--config", to_str(&config)]);
    assert_eq!(out.status.code(), Some(23));
}

// ---------------------------------------------------------------------------
// Rules, priorities, clear
// ---------------------------------------------------------------------------

#[test]
fn rules_and_priorities_persist_then_clear() {
    let sb = Sandbox::new();
    assert!(sb.ingest_fixtures().status.success());

    let rules = sb.write(
        "rules.json",
        r#"[{"id": "r1", "type": "coRun", "params": {"tasks": ["T1", "T2"]}}]"#,
    );
    let out = sb.run(&["rules", "set", to_str(&rules)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = sb.run(&["priorities", "set", "--fairness", "50"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let state = sb.state();
    assert_eq!(state["rules"][0]["type"], "coRun");
    assert_eq!(state["rules"][0]["enabled"], true);
    assert_eq!(state["priorities"]["Fairness"], 50.0);
    assert_eq!(state["priorities"]["PriorityLevel"], 40.0);

    let out = sb.run(&["rules", "list"]);
    assert_eq!(stdout_json(&out)[0]["id"], "r1");

    let out = sb.run(&["clear"]);
    assert!(out.status.success());
    assert!(!sb.state_file().exists());
    let status = stdout_json(&sb.run(&["status", "--json"]));
    assert_eq!(status["isDataLoaded"], false);
    assert_eq!(status["rules"], 0);
}

#[test]
fn malformed_rules_file_is_parse_error() {
    let sb = Sandbox::new();
    let rules = sb.write("rules.json", r#"[{"id": "r1", "type": "teleport"}]"#);
    let out = sb.run(&["rules", "set", to_str(&rules)]);
    assert_eq!(out.status.code(), Some(4));
}

// ---------------------------------------------------------------------------
// Assist doctor
// ---------------------------------------------------------------------------

#[test]
fn doctor_reports_heuristic_ready() {
    let sb = Sandbox::new();
    let out = sb.run(&["assist", "doctor", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let diag = stdout_json(&out);
    assert_eq!(diag["provider"], "heuristic");
    assert_eq!(diag["status"], "ready");
}

#[test]
fn doctor_reports_disabled() {
    let sb = Sandbox::new();
    sb.write("settings.json", r#"{ "assist": { "provider": "none" } }"#);
    let out = sb.run(&["assist", "doctor"]);
    assert_eq!(out.status.code(), Some(10));
}
