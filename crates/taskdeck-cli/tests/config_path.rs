use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("refresh_timeout_secs = 10"));
    assert!(contents.contains("# base_url ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_base_url_persists() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .args(["config", "set-base-url", "https://tasks.example.com/api/v1/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://tasks.example.com/api/v1"));

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains(r#"base_url = "https://tasks.example.com/api/v1""#));
}

#[test]
fn test_set_base_url_rejects_garbage() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .args(["config", "set-base-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid URL"));
}

#[test]
fn test_protected_command_requires_login() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", dir.path())
        .env("TASKDECK_BASE_URL", "http://127.0.0.1:9/api/v1")
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}
