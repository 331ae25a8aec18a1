//! Adding a dependency to a module.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::process::ProcessBuilder;

/// Adds `target` as a dependency of the module rooted at `module_dir`,
/// downloading and resolving it as needed.
pub trait DependencyFetcher {
    fn fetch(&self, module_dir: &Path, target: &str) -> Result<()>;
}

/// Fetcher that runs `<tool> get <target>` in the module directory.
#[derive(Debug, Clone)]
pub struct ModuleGet {
    tool: PathBuf,
}

impl ModuleGet {
    /// Create a fetcher for the given module tool.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        ModuleGet { tool: tool.into() }
    }

    fn command(&self, module_dir: &Path, target: &str) -> ProcessBuilder {
        ProcessBuilder::new(&self.tool)
            .args(["get", target])
            .cwd(module_dir)
    }
}

impl DependencyFetcher for ModuleGet {
    fn fetch(&self, module_dir: &Path, target: &str) -> Result<()> {
        let cmd = self.command(module_dir, target);
        tracing::info!("Fetching {} in {}", target, module_dir.display());
        cmd.exec_and_check()?;
        Ok(())
    }
}
