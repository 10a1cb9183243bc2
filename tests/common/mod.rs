//! Common test utilities for bt integration tests.
//!
//! Provides `TestEnv`, an isolated project root so tests never touch the
//! working tree they are run from.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A temporary project root.
///
/// The `bt()` method returns a `Command` that points `BT_ROOT` at the
/// temp directory per invocation, making tests parallel-safe.
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// A Command for the bt binary bound to this root.
    pub fn bt(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bt"));
        cmd.current_dir(self.root.path());
        cmd.env("BT_ROOT", self.root.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn bugs_dir(&self) -> PathBuf {
        self.root.path().join("data").join("bugs")
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.root.path().join("data").join("memory")
    }

    /// Open a bug and return its id.
    pub fn open(&self, title: &str) -> String {
        let output = self
            .bt()
            .args(["--silent", "open", title])
            .output()
            .expect("Failed to run bt open");
        assert!(output.status.success(), "bt open failed: {output:?}");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Full text of the record whose filename starts with `id`.
    pub fn record(&self, id: &str) -> String {
        let entry = fs::read_dir(self.bugs_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&format!("{id}-")) || n == format!("{id}.md"))
            })
            .expect("record file not found");
        fs::read_to_string(entry).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
