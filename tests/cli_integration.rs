//! Integration tests for the credmgr CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Each run is its own process, so on platforms without a credential
//! vault nothing survives between invocations; tests stick to single
//! commands and their exit codes.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the credmgr binary.
fn credmgr() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("credmgr").expect("binary should exist");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    credmgr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform credential vault manager"))
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("exists"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag_shows_version() {
    credmgr()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credmgr"));
}

#[test]
fn no_args_shows_help() {
    credmgr()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_type_is_rejected() {
    credmgr()
        .args(["--type", "bogus", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn save_with_inline_secret_succeeds() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["save", "credmgr-test/cli-save", "-u", "alice", "-s", "pw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 'credmgr-test/cli-save'"))
        .stderr(predicate::str::contains("shell history"));

    credmgr()
        .current_dir(tmp.path())
        .args(["delete", "--force", "credmgr-test/cli-save"])
        .assert();
}

#[test]
fn save_reads_piped_secret() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["save", "credmgr-test/cli-piped"])
        .write_stdin("from-stdin\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    credmgr()
        .current_dir(tmp.path())
        .args(["delete", "--force", "credmgr-test/cli-piped"])
        .assert();
}

#[test]
fn oversized_secret_fails() {
    let tmp = TempDir::new().unwrap();
    let secret = "x".repeat(300);
    credmgr()
        .current_dir(tmp.path())
        .args(["save", "credmgr-test/cli-big", "-s", secret.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the maximum length of 512"));
}

#[test]
fn get_missing_credential_fails() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["get", "credmgr-test/does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential found"));
}

#[test]
fn exists_missing_credential_fails() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["exists", "credmgr-test/does-not-exist"])
        .assert()
        .failure();
}

#[test]
fn delete_missing_credential_fails() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["delete", "--force", "credmgr-test/does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential found"));
}

#[test]
fn list_json_is_an_array() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["list", "credmgr-test/none-here", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[cfg(not(windows))]
#[test]
fn list_on_empty_vault_shows_hint() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No credentials found"));
}

#[cfg(not(windows))]
#[test]
fn prompt_without_terminal_is_cancelled() {
    let tmp = TempDir::new().unwrap();
    credmgr()
        .current_dir(tmp.path())
        .args(["prompt", "credmgr-test/prompt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User cancelled"));
}

#[test]
fn completions_for_bash() {
    credmgr()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("credmgr"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".credmgr.toml").write_str("not valid {{toml").unwrap();

    credmgr()
        .current_dir(tmp.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}

#[test]
fn config_text_format_is_accepted() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".credmgr.toml")
        .write_str("text_format = \"ansi\"\ncredential_type = \"generic\"\n")
        .unwrap();

    credmgr()
        .current_dir(tmp.path())
        .args(["list", "credmgr-test/none-here", "--json"])
        .assert()
        .success();
}
