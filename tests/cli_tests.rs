//! Watch management through the CLI binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let database = dir.path().join("farewatch.db");
        let config = dir.path().join("config.toml");
        fs::write(
            &config,
            format!("database = {:?}\n\n[logging]\nlevel = \"warn\"\n", database.to_string_lossy()),
        )
        .expect("write config");
        Self { dir, config }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("farewatch");
        cmd.current_dir(self.dir.path())
            .env_remove("ALPHA_API_KEY")
            .env_remove("BETA_API_KEY")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run farewatch");
        assert!(
            output.status.success(),
            "farewatch {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
    }
}

fn watch_json(id: &str, interval: u64) -> String {
    serde_json::json!({
        "id": id,
        "owner": "owner-1",
        "itinerary": {
            "provider": "alpha",
            "legs": [{ "origin": "GRU", "destination": "JFK", "date": "2030-06-15" }]
        },
        "check_interval_secs": interval,
        "auto_hold": true,
        "manifest": [{ "category": "adult", "details": { "name": "ADA LOVELACE" } }]
    })
    .to_string()
}

fn add(workspace: &Workspace, id: &str) -> PathBuf {
    let file = workspace.write(&format!("{id}.json"), &watch_json(id, 600));
    workspace
        .cmd()
        .arg("add")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(id));
    file
}

fn listed_ids(workspace: &Workspace) -> Vec<String> {
    let listing = workspace.json(&["list"]);
    assert_eq!(listing["command"], "list");
    listing["watches"]
        .as_array()
        .expect("watches array")
        .iter()
        .map(|w| w["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn add_list_remove_round_trip() {
    let workspace = Workspace::new();
    add(&workspace, "cli-1");

    let listing = workspace.json(&["list"]);
    let watches = listing["watches"].as_array().unwrap();
    assert_eq!(watches.len(), 1);
    assert_eq!(watches[0]["id"], "cli-1");
    assert_eq!(watches[0]["provider"], "alpha");
    assert_eq!(watches[0]["auto_hold"], true);
    assert_eq!(watches[0]["progress"], 1.0);
    assert!(watches[0]["current_price"].is_null());

    let removed = workspace.json(&["remove", "cli-1"]);
    assert_eq!(removed["watch_id"], "cli-1");
    assert!(listed_ids(&workspace).is_empty());
}

#[test]
fn list_shows_table_for_humans() {
    let workspace = Workspace::new();
    add(&workspace, "cli-1");

    workspace
        .cmd()
        .args(["--color", "never", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active watches (1)"))
        .stdout(predicate::str::contains("cli-1"))
        .stdout(predicate::str::contains("GRU→JFK"));
}

#[test]
fn empty_list_hints_at_add() {
    let workspace = Workspace::new();

    workspace
        .cmd()
        .args(["--color", "never", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active watches"));
}

#[test]
fn duplicate_add_fails() {
    let workspace = Workspace::new();
    let file = add(&workspace, "cli-1");

    workspace
        .cmd()
        .arg("add")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_rejects_interval_below_provider_minimum() {
    let workspace = Workspace::new();
    let file = workspace.write("fast.json", &watch_json("fast", 30));

    workspace
        .cmd()
        .arg("add")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("below the provider minimum"));
    assert!(listed_ids(&workspace).is_empty());
}

#[test]
fn add_rejects_malformed_json() {
    let workspace = Workspace::new();
    let file = workspace.write("broken.json", "{ \"owner\": ");

    workspace.cmd().arg("add").arg(&file).assert().failure();
}

#[test]
fn remove_unknown_watch_fails() {
    let workspace = Workspace::new();

    workspace
        .cmd()
        .args(["remove", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn check_without_configured_provider_reports_failed_check() {
    let workspace = Workspace::new();
    add(&workspace, "cli-1");

    let summary = workspace.json(&["check", "cli-1"]);
    assert_eq!(summary["command"], "check");
    assert_eq!(summary["outcome"], "check_failed");
    assert_eq!(summary["retired"], false);
    assert!(summary["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("not configured"));

    let listing = workspace.json(&["list"]);
    assert!(listing["watches"][0]["last_checked_at"].is_string());
}

#[test]
fn check_unknown_watch_fails() {
    let workspace = Workspace::new();

    workspace.cmd().args(["check", "missing"]).assert().failure();
}

#[test]
fn invalid_config_exits_nonzero() {
    let workspace = Workspace::new();
    let config = workspace.write("bad.toml", "[logging]\nformat = \"xml\"\n");

    let output = cargo_bin_cmd!("farewatch")
        .current_dir(workspace.dir.path())
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .expect("run farewatch");

    assert!(!output.status.success(), "expected nonzero exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("logging.format"),
        "expected error about logging.format, got: {stderr}"
    );
}

#[test]
fn missing_config_file_uses_defaults() {
    let workspace = Workspace::new();
    let absent: &Path = Path::new("absent.toml");

    cargo_bin_cmd!("farewatch")
        .current_dir(workspace.dir.path())
        .arg("--config")
        .arg(absent)
        .args(["--json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"watches\":[]"));
    assert!(workspace.dir.path().join("farewatch.db").exists());
}
