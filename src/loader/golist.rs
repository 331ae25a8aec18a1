//! Loader backed by `<tool> list -json -deps`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{FileSet, Module, ModuleId, Package, PackageId, PackageSet};
use crate::loader::imports::{FileHeader, HeaderScanner};
use crate::loader::PackageLoader;
use crate::util::fs::read;
use crate::util::process::ProcessBuilder;

/// One package as printed by `list -json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedPackage {
    import_path: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    module: Option<ListedModule>,
    #[serde(default)]
    go_files: Vec<String>,
    #[serde(default)]
    cgo_files: Vec<String>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    import_map: HashMap<String, String>,
    #[serde(default)]
    dep_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedModule {
    path: String,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    go_mod: Option<PathBuf>,
    #[serde(default)]
    main: bool,
}

/// Loads packages by listing them with the module tool.
#[derive(Debug, Clone)]
pub struct GoListLoader {
    tool: PathBuf,
}

impl GoListLoader {
    /// Create a loader for the given module tool.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        GoListLoader { tool: tool.into() }
    }

    fn command(&self, dir: Option<&Path>, patterns: &[String]) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.tool)
            .args(["list", "-json", "-deps", "--"])
            .args(patterns);
        if let Some(dir) = dir {
            cmd = cmd.cwd(dir);
        }
        cmd
    }
}

impl PackageLoader for GoListLoader {
    fn load(&self, dir: Option<&Path>, patterns: &[String]) -> Result<PackageSet> {
        let output = self.command(dir, patterns).exec_and_check()?;
        parse_listing(&output.stdout)
    }
}

/// Build a package set from a `list -json -deps` stream.
///
/// Packages not marked `DepOnly` are the roots. Root packages share one
/// position table covering all of their source files, and their imports are
/// ordered by first appearance in those files rather than the sorted order
/// of the listing. Imports not found in the sources keep their listed order
/// after the others.
pub fn parse_listing(listing: &[u8]) -> Result<PackageSet> {
    let listed = serde_json::Deserializer::from_slice(listing)
        .into_iter::<ListedPackage>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to decode package listing")?;

    let mut set = PackageSet::new();
    let mut modules: HashMap<(String, Option<PathBuf>), ModuleId> = HashMap::new();
    let mut by_path: HashMap<String, PackageId> = HashMap::new();
    let mut ids = Vec::with_capacity(listed.len());

    for pkg in &listed {
        let module = pkg.module.as_ref().map(|m| {
            *modules
                .entry((m.path.clone(), m.dir.clone()))
                .or_insert_with(|| {
                    let mut module = Module::new(&m.path, m.dir.clone().unwrap_or_default());
                    module.manifest = m.go_mod.clone();
                    module.main = m.main;
                    set.add_module(module)
                })
        });

        let mut package = Package::new(&pkg.import_path, &pkg.name);
        package.dir = pkg.dir.clone();
        package.module = module;
        if let Some(ref dir) = pkg.dir {
            package.files = pkg
                .go_files
                .iter()
                .chain(&pkg.cgo_files)
                .map(|f| dir.join(f))
                .collect();
        }

        let id = set.add_package(package);
        by_path.insert(pkg.import_path.clone(), id);
        ids.push(id);
    }

    let scanner = HeaderScanner::new()?;
    let mut fset = FileSet::new();
    let mut roots = Vec::new();
    for (pkg, &id) in listed.iter().zip(&ids) {
        if pkg.dep_only {
            continue;
        }
        let mut headers = Vec::new();
        for file in &set.package(id).files {
            let content = read(file)?;
            headers.push(scanner.scan(&String::from_utf8_lossy(&content)));
            fset.push_file(file.clone(), &content)?;
        }
        roots.push((id, headers));
    }

    for (pkg, &id) in listed.iter().zip(&ids) {
        let mut imports: Vec<&str> = pkg
            .imports
            .iter()
            .map(|import| pkg.import_map.get(import).unwrap_or(import).as_str())
            .collect();
        if let Some((_, headers)) = roots.iter().find(|(root, _)| *root == id) {
            sort_by_source_order(&mut imports, headers, &pkg.import_map);
        }
        for resolved in imports {
            match by_path.get(resolved) {
                Some(&dep) => set.add_import(id, dep),
                None => tracing::debug!("{} imports unlisted package {}", pkg.import_path, resolved),
            }
        }
    }

    let fset = Arc::new(fset);
    for (id, _) in roots {
        set.package_mut(id).fset = Arc::clone(&fset);
        set.mark_root(id);
    }

    tracing::debug!(
        "listed {} packages ({} roots)",
        set.len(),
        set.roots().len()
    );

    Ok(set)
}

/// Stable-sort `imports` by where each first appears in `headers`.
fn sort_by_source_order(
    imports: &mut [&str],
    headers: &[FileHeader],
    import_map: &HashMap<String, String>,
) {
    let mut rank: HashMap<&str, usize> = HashMap::new();
    for import in headers.iter().flat_map(|h| &h.imports) {
        let resolved = import_map.get(import).unwrap_or(import).as_str();
        let next = rank.len();
        rank.entry(resolved).or_insert(next);
    }
    imports.sort_by_key(|import| rank.get(import).copied().unwrap_or(usize::MAX));
}
