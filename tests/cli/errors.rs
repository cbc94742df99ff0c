//! Tests for error handling and CLI flags.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.run(&["--help"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Usage");
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.run(&["--version"]);
    assert_success(&output);
    assert_stdout_contains(&output, "cellar");
}

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("env")
            .and(predicate::str::contains("encrypt"))
            .and(predicate::str::contains("keygen")),
    );
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert!(!t.run(&["unknown-command"]).status.success());
}

#[test]
fn test_missing_config() {
    let t = Test::new();

    let output = t.run(&["env", "app", "default"]);
    assert_exit_code(&output, 2);
    assert_stderr_contains(&output, "config file not found");
    assert_stdout_contains(&output, "--config");
}

#[test]
fn test_explicit_config_path() {
    let t = Test::new();
    t.write("elsewhere/repo/app.properties", "k=v\n");
    t.write("elsewhere/service.toml", "[source]\ndir = \"repo\"\n");

    let output = t.run(&["env", "app", "default", "--json", "--config", "elsewhere/service.toml"]);
    assert_success(&output);
    assert_stdout_contains(&output, "\"k\": \"v\"");
}

#[test]
fn test_config_from_environment() {
    let t = Test::new();
    t.write("elsewhere/repo/app.properties", "k=v\n");
    t.write("elsewhere/service.toml", "[source]\ndir = \"repo\"\n");

    let output = t
        .cmd()
        .env("CELLAR_CONFIG", t.path().join("elsewhere/service.toml"))
        .args(["env", "app", "default", "--json"])
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_invalid_config() {
    let t = Test::new();
    t.write_config("[source]\n");

    let output = t.run(&["status"]);
    assert_exit_code(&output, 2);
    assert_stderr_contains(&output, "source.git");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let t = Test::dir(&[("app.properties", "k=v\n")], NO_KEYS);

    let output = t.run(&["--verbose", "env", "app", "default", "--json"]);
    assert_success(&output);
    assert_stderr_contains(&output, "resolved documents");
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["name"], "app");
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.run(&["completions", "bash"]);
    assert_success(&output);
    assert_stdout_contains(&output, "cellar");
}
