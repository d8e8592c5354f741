//! CLI output integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn farewatch() -> Command {
    cargo_bin_cmd!("farewatch")
}

#[test]
fn test_help() {
    farewatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("farewatch"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn test_version() {
    farewatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("farewatch"));
}

#[test]
fn test_run_help_lists_overrides() {
    farewatch()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-level"))
        .stdout(predicate::str::contains("--database"))
        .stdout(predicate::str::contains("--memory"));
}

#[test]
fn test_unknown_subcommand_fails() {
    farewatch().arg("book").assert().failure();
}

#[test]
fn test_check_requires_watch_id() {
    farewatch()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ID>"));
}
