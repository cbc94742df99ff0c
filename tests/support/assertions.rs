//! Test assertion helpers.

use std::process::Output;

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Assert that a command failed with a specific exit code.
pub fn assert_exit_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected exit code, stderr: {}",
        stderr(output)
    );
}

/// Get stdout as String.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as String.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert stdout contains a string.
pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout missing '{}', got: {}",
        expected,
        out
    );
}

/// Assert stderr contains a string.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

/// Property sources of an `env --json` document, as (name, source) pairs.
pub fn sources(env: &serde_json::Value) -> Vec<(String, serde_json::Value)> {
    env["propertySources"]
        .as_array()
        .expect("propertySources is not an array")
        .iter()
        .map(|s| (s["name"].as_str().unwrap_or_default().to_string(), s["source"].clone()))
        .collect()
}

/// First value for `key` across property sources (highest priority wins).
pub fn lookup(env: &serde_json::Value, key: &str) -> Option<String> {
    sources(env)
        .into_iter()
        .find_map(|(_, source)| source.get(key).and_then(|v| v.as_str()).map(str::to_string))
}
