//! Configuration management.
//!
//! This module resolves the project root once per invocation and turns it
//! into a [`StoreConfig`] that is handed to the stores. Nothing below the
//! CLI layer looks at the current directory or the environment.
//!
//! # Layout
//!
//! - **Records**: `<root>/data/bugs/BUG-<id>-<slug>.md`
//! - **Memory**: `<root>/data/memory/<namespace>.json`
//!
//! The shared `data/` folder can be versioned selectively via `.gitignore`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directories whose presence marks a project root.
pub const PROJECT_MARKERS: [&str; 3] = [".cursor", ".claude", ".git"];

/// Environment variable overriding root discovery.
pub const ROOT_ENV: &str = "BT_ROOT";

/// Resolved locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    root: PathBuf,
}

impl StoreConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the configuration for this process.
    ///
    /// Priority:
    /// 1. `explicit_root` (the `--root` flag, which clap also fills from `BT_ROOT`)
    /// 2. Nearest ancestor of the current directory holding a project marker
    /// 3. The current directory
    ///
    /// # Errors
    ///
    /// Returns a config error if the current directory cannot be determined.
    pub fn resolve(explicit_root: Option<&Path>) -> Result<Self> {
        if let Some(root) = explicit_root {
            return Ok(Self::new(root));
        }

        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Could not determine current directory: {e}")))?;
        Ok(Self::new(discover_project_root(&cwd).unwrap_or(cwd)))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    #[must_use]
    pub fn bugs_dir(&self) -> PathBuf {
        self.data_dir().join("bugs")
    }

    #[must_use]
    pub fn memory_dir(&self) -> PathBuf {
        self.data_dir().join("memory")
    }
}

/// Walk up from `start` looking for a directory containing a project marker.
///
/// The filesystem root itself is never returned.
#[must_use]
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let parent = dir.parent()?;
        if PROJECT_MARKERS.iter().any(|m| dir.join(m).exists()) {
            return Some(dir.to_path_buf());
        }
        dir = parent;
    }
}
