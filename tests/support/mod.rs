//! Test support utilities for cellar integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod repo;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test environment with an isolated temp directory.
///
/// Layout:
///
/// ```text
/// <dir>/
/// ├── cellar.toml
/// ├── repo/        # git repository (or plain directory) with documents
/// └── keys.toml    # keystore, when configured
/// ```
///
/// No process-global state is mutated; child processes use `.current_dir()`
/// so tests can safely run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Create an empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// A git-backed environment with `files` committed on the default branch.
    pub fn git(files: &[(&str, &str)], encrypt: &str) -> Self {
        let t = Self::new();
        repo::init(&t.repo_path());
        repo::commit(&t.repo_path(), files, "initial config");
        t.write_config(&format!("[source]\ngit = \"repo\"\n\n{}", encrypt));
        t
    }

    /// A directory-backed environment holding `files`.
    pub fn dir(files: &[(&str, &str)], encrypt: &str) -> Self {
        let t = Self::new();
        std::fs::create_dir_all(t.repo_path()).expect("failed to create source dir");
        for (path, content) in files {
            t.write(&format!("repo/{}", path), content);
        }
        t.write_config(&format!("[source]\ndir = \"repo\"\n\n{}", encrypt));
        t
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo_path(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    /// Write `cellar.toml`.
    pub fn write_config(&self, contents: &str) {
        self.write("cellar.toml", contents);
    }

    /// Write a file relative to the test directory.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(path, contents).expect("failed to write file");
    }

    /// Commit more files to the git repository.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        repo::commit(&self.repo_path(), files, message)
    }
}
