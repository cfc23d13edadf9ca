//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Search pattern for acquisition files under `<root>/daq`
pub const DAQ_SEARCH: &str =
    "{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}.*";

/// A temporary production tree with a setup file
pub struct Production {
    dir: TempDir,
}

impl Production {
    /// Create the tree and write `setup.yaml` with `$_`-relative roots
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("setup.yaml"),
            "paths:\n  tier: $_/gen/tier\n  par: $_/gen/par\n  plt: $_/gen/plt\n  tmp: $_/gen/tmp\n",
        )?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn setup_file(&self) -> PathBuf {
        self.root().join("setup.yaml")
    }

    /// The acquisition search pattern rooted in this tree
    pub fn daq_search(&self) -> String {
        format!("{}/{}", self.root().join("daq").display(), DAQ_SEARCH)
    }

    /// Create an empty file, along with its parent directories
    pub fn touch(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"")?;
        Ok(path)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        fs::write(&path, content)?;
        Ok(path)
    }
}
