//! CLI end-to-end tests that invoke the compiled `mirror` binary.
//!
//! Every test points the config directory at a scratch folder and clears
//! the token, so nothing here reaches the network.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mirror(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mirror").unwrap();
    cmd.env("MIRROR_CONFIG_DIR", config_dir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("pull")
                .and(predicate::str::contains("push"))
                .and(predicate::str::contains("force"))
                .and(predicate::str::contains("cron-check")),
        );
}

#[test]
fn no_command_prints_hint() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mirror --help"));
}

#[test]
fn cron_check_accepts_valid_expression() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["cron-check", "*/15 9-17 * * 1-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid schedule"));
}

#[test]
fn cron_check_reports_gap_since_instant() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["cron-check", "* * * * *", "--since", "2024-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would have run"));
}

#[test]
fn cron_check_rejects_out_of_range_field() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["cron-check", "0 25 * * *"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schedule"));
}

#[test]
fn network_commands_require_token() {
    let temp = TempDir::new().unwrap();
    for args in [
        vec!["pull", "octo/notes"],
        vec!["push", "octo/notes"],
        vec!["status", "octo/notes"],
        vec!["force", "octo/notes", "--mode", "remote", "--yes"],
    ] {
        mirror(temp.path())
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No access token"));
    }
}

#[test]
fn changes_work_offline() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("notes");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("draft.md"), "hello").unwrap();

    mirror(temp.path())
        .args(["changes", "octo/notes", "--json", "--path"])
        .arg(&folder)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"draft.md\"").and(predicate::str::contains("\"added\"")),
        );
}

#[test]
fn changes_on_clean_folder() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("notes");
    fs::create_dir_all(&folder).unwrap();

    mirror(temp.path())
        .args(["changes", "octo/notes", "--path"])
        .arg(&folder)
        .assert()
        .success()
        .stdout(predicate::str::contains("No local changes"));
}

#[test]
fn invalid_reference_is_reported() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["changes", "https://github.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid repository reference"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["changes", "octo/notes", "--config"])
        .arg(temp.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn catch_up_without_repos_does_nothing() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["catch-up", "--token", "t0ken"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No missed syncs"));
}

#[test]
fn daemon_without_schedules_exits() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "[[repos]]\nreference = \"octo/notes\"\n",
    )
    .unwrap();

    mirror(temp.path())
        .args(["daemon", "--token", "t0ken"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No repositories with a schedule"));
}

#[test]
fn completions_generate_for_bash() {
    let temp = TempDir::new().unwrap();
    mirror(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mirror"));
}
