//! Configuration for package loading and environment reconstruction.
//!
//! There is no configuration file. Values come from the command line, which
//! falls back to environment variables (`EXTPKG_GO`, `GOROOT`,
//! `EXTPKG_TMPDIR`), and then to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::resolver::SearchMode;
use crate::util::process::{find_executable, ProcessBuilder};

/// Name of the module tool looked up in PATH by default.
pub const DEFAULT_TOOL: &str = "go";

/// Placeholder some loaders record in place of the standard library root.
pub const STD_ROOT_PLACEHOLDER: &str = "$GOROOT";

/// Settings shared by the loader, the fetcher and the reconstructor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Module tool (`list`, `get` and `env` subcommands)
    pub tool: PathBuf,

    /// Standard library root; discovered lazily when unset
    pub std_root: Option<PathBuf>,

    /// Import graph walk used by the reachability check
    pub search: SearchMode,

    /// Parent directory for temporary module clones (system temp dir if unset)
    pub temp_root: Option<PathBuf>,

    /// Directory of the initial load (current directory if unset)
    pub cwd: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tool: PathBuf::from(DEFAULT_TOOL),
            std_root: None,
            search: SearchMode::default(),
            temp_root: None,
            cwd: None,
        }
    }
}

impl Config {
    /// Set the module tool.
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Set the standard library root.
    pub fn with_std_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.std_root = Some(root.into());
        self
    }

    /// Set the search mode.
    pub fn with_search(mut self, search: SearchMode) -> Self {
        self.search = search;
        self
    }

    /// Set the parent directory for temporary clones.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Set the directory of the initial load.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The module tool, resolved through PATH when it is a bare name.
    pub fn tool_path(&self) -> PathBuf {
        if self.tool.components().count() == 1 {
            if let Some(found) = find_executable(&self.tool) {
                return found;
            }
        }
        self.tool.clone()
    }

    /// The standard library root.
    ///
    /// Uses the configured value, then `GOROOT`, then asks the module tool.
    pub fn std_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.std_root {
            return Ok(root.clone());
        }

        if let Some(root) = std::env::var_os("GOROOT").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(root));
        }

        let output = ProcessBuilder::new(self.tool_path())
            .args(["env", "GOROOT"])
            .exec_and_check()?;
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            bail!("`{} env GOROOT` printed nothing", self.tool.display());
        }
        tracing::debug!("standard library root: {}", root);
        Ok(PathBuf::from(root))
    }

    /// Directory for the initial load.
    pub fn load_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}
