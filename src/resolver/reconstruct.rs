//! Rebuilding a module in a scratch directory so that a package it does not
//! import yet becomes part of its package graph.
//!
//! The pipeline is: check that exactly one module owns the loaded packages,
//! copy that module into a temporary directory, add one import-only file per
//! loaded package, let the fetcher add the dependency, load the patterns again
//! from the copy, and finally point every recorded path back at the original
//! module directory. The first failing stage aborts the whole call.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::{Module, ModuleId, PackageSet};
use crate::loader::PackageLoader;
use crate::resolver::errors::ResolveError;
use crate::resolver::fetch::DependencyFetcher;
use crate::resolver::rewrite::PathRewriter;
use crate::util::fs::{copy_dir_all, normalize_path, rebase};
use crate::util::Config;

/// Prefix of the import-only files written into the clone.
pub const SYNTHETIC_PREFIX: &str = "imports-";

/// Find the single module owning the root packages.
///
/// A mix of module-owned and module-less roots counts as more than one module.
pub fn owning_module(packages: &PackageSet) -> Result<ModuleId, ResolveError> {
    let mut owners: Vec<Option<ModuleId>> = packages
        .root_packages()
        .map(|(_, pkg)| pkg.module)
        .collect();
    owners.sort();
    owners.dedup();

    match owners.as_slice() {
        [Some(module)] => Ok(*module),
        [] | [None] => Err(ResolveError::NoModule),
        _ => Err(ResolveError::MultipleModules {
            modules: owners
                .iter()
                .map(|owner| match owner {
                    Some(id) => packages.module(*id).path.clone(),
                    None => "<none>".to_string(),
                })
                .collect(),
        }),
    }
}

/// Source of an import-only file for package `name`.
pub fn synthetic_source(package_name: &str, target: &str) -> String {
    format!("package {}\nimport _ {}\n", package_name, quote(target))
}

/// Quote `s` as an interpreted string literal of the module tool's language.
///
/// Printable characters are kept as is; control characters use the short
/// escapes where one exists and `\x`, `\u` or `\U` escapes otherwise.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\u{07}' => quoted.push_str("\\a"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0c}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{0b}' => quoted.push_str("\\v"),
            c if (c as u32) < 0x80 && c.is_control() => {
                quoted.push_str(&format!("\\x{:02x}", c as u32))
            }
            c if c.is_control() && (c as u32) < 0x10000 => {
                quoted.push_str(&format!("\\u{:04x}", c as u32))
            }
            c if c.is_control() => quoted.push_str(&format!("\\U{:08x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// A disposable copy of a module, removed when dropped.
#[derive(Debug)]
pub struct TempClone {
    dir: TempDir,
    canonical: PathBuf,
}

impl TempClone {
    /// Copy `module` into a fresh temporary directory under `parent`.
    pub fn create(module: &Module, parent: Option<&Path>) -> Result<Self> {
        let prefix = format!("external-{}-", module.sanitized_path());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .context("failed to create temporary directory")?;

        copy_dir_all(module.dir(), dir.path())?;

        let canonical = normalize_path(dir.path());
        Ok(TempClone { dir, canonical })
    }

    /// Root of the copy.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Map a path inside the copy to the same place under `to`.
    ///
    /// Accepts the path as created or in canonical form.
    pub fn rebase(&self, path: &Path, to: &Path) -> Option<PathBuf> {
        rebase(path, self.dir.path(), to).or_else(|| rebase(path, &self.canonical, to))
    }
}

/// Rebuilds module environments using a loader and a fetcher.
pub struct Reconstructor<'a> {
    loader: &'a dyn PackageLoader,
    fetcher: &'a dyn DependencyFetcher,
    config: &'a Config,
}

impl<'a> Reconstructor<'a> {
    pub fn new(
        loader: &'a dyn PackageLoader,
        fetcher: &'a dyn DependencyFetcher,
        config: &'a Config,
    ) -> Self {
        Reconstructor {
            loader,
            fetcher,
            config,
        }
    }

    /// Load `patterns` again with `target` added as a dependency of the
    /// module owning `loaded`.
    ///
    /// The returned packages report the original module directory everywhere;
    /// the temporary copy is gone by the time this returns.
    pub fn resolve(
        &self,
        target: &str,
        loaded: &PackageSet,
        patterns: &[String],
    ) -> Result<PackageSet> {
        let module_id = owning_module(loaded)?;
        let module = loaded.module(module_id).clone();

        let clone = TempClone::create(&module, self.config.temp_root.as_deref())?;
        tracing::info!(
            "Cloned {} into {}",
            module.dir().display(),
            clone.path().display()
        );

        let synthetic = self.inject(&clone, &module, loaded, target)?;

        self.fetcher.fetch(clone.path(), target)?;

        let load_dir = self.reload_dir(&clone, &module);
        tracing::info!("Reloading {} from {}", patterns.join(" "), load_dir.display());
        let mut packages = self.loader.load(Some(&load_dir), patterns)?;

        let synthetic: BTreeSet<PathBuf> = synthetic
            .iter()
            .filter_map(|path| clone.rebase(path, module.dir()))
            .collect();
        PathRewriter::new(&clone, module.dir(), &synthetic, self.config).rewrite(&mut packages)?;

        Ok(packages)
    }

    /// Write one import-only file per loaded root package.
    fn inject(
        &self,
        clone: &TempClone,
        module: &Module,
        loaded: &PackageSet,
        target: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (_, pkg) in loaded.root_packages() {
            let dir = pkg
                .dir
                .as_deref()
                .and_then(|dir| rebase(dir, module.dir(), clone.path()))
                .filter(|dir| dir.is_dir())
                .unwrap_or_else(|| clone.path().to_path_buf());

            let (mut file, path) = tempfile::Builder::new()
                .prefix(SYNTHETIC_PREFIX)
                .suffix(".go")
                .tempfile_in(&dir)
                .with_context(|| format!("failed to create import file in {}", dir.display()))?
                .keep()?;
            file.write_all(synthetic_source(&pkg.name, target).as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;

            tracing::debug!("{} imports {} via {}", pkg.path, target, path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Where the reload runs: the copy of the initial load directory when that
    /// lies inside the module, otherwise the root of the copy.
    fn reload_dir(&self, clone: &TempClone, module: &Module) -> PathBuf {
        let origin = match self.config.load_dir() {
            Some(dir) => Some(dir.to_path_buf()),
            None => std::env::current_dir().ok(),
        };
        origin
            .and_then(|dir| rebase(&normalize_path(&dir), &normalize_path(module.dir()), clone.path()))
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| clone.path().to_path_buf())
    }
}
