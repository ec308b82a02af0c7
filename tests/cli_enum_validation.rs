use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn bin(root: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("netscaler-graph").unwrap();
    cmd.current_dir(root).env("HOME", root).env_remove("RUST_LOG");
    cmd
}

#[test]
fn invalid_rankdir_value_is_rejected() {
    let dir = tempdir().unwrap();
    bin(dir.path())
        .args(["dot", "--rankdir", "XY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value").and(predicate::str::contains("XY")));
}

#[test]
fn invalid_ignore_type_lists_valid_kinds() {
    let dir = tempdir().unwrap();
    bin(dir.path())
        .args(["dot", "--ignore-type", "Router"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ignore-type: Router"))
        .stderr(predicate::str::contains("GSLBVServer"));
}

#[test]
fn ignore_type_is_case_insensitive() {
    let dir = tempdir().unwrap();
    bin(dir.path())
        .args(["dot", "--stdout", "--ignore-type", "lbvserver,cert"])
        .assert()
        .success();
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let dir = tempdir().unwrap();
    bin(dir.path())
        .arg("svg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn verbose_and_quiet_conflict() {
    let dir = tempdir().unwrap();
    bin(dir.path())
        .args(["dot", "-v", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
