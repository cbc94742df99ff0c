//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a cellar command isolated from the caller's environment.
    ///
    /// Returns a Command configured with:
    /// - Current directory set to the test directory
    /// - No cellar environment overrides, and colors off
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cellar").expect("failed to find cellar binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("CELLAR_CONFIG");
        cmd.env_remove("CELLAR_ENCRYPT_KEY");
        cmd.env_remove("CELLAR_LOG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Run `cellar` with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run cellar")
    }

    /// Shortcut for `cellar env --json`.
    pub fn env_json(&self, app: &str, profile: &str, label: Option<&str>) -> serde_json::Value {
        let mut args = vec!["env", app, profile];
        if let Some(label) = label {
            args.push(label);
        }
        args.push("--json");

        let output = self.run(&args);
        super::assert_success(&output);
        serde_json::from_slice(&output.stdout).expect("env --json is not JSON")
    }

    /// Shortcut for `cellar encrypt`, returning the trimmed cipher text.
    pub fn encrypt(&self, value: &str, extra: &[&str]) -> String {
        let mut args = vec!["encrypt", value];
        args.extend_from_slice(extra);
        let output = self.run(&args);
        super::assert_success(&output);
        super::stdout(&output).trim().to_string()
    }

    /// Shortcut for `cellar decrypt`.
    pub fn decrypt(&self, value: &str, extra: &[&str]) -> Output {
        let mut args = vec!["decrypt", value];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// Shortcut for `cellar keygen`.
    pub fn keygen(&self, alias: &str) -> Output {
        self.run(&["keygen", alias])
    }
}
