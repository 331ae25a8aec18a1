//! Pointing a package set loaded from a temporary clone back at the
//! original module directory.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::{FileSet, PackageSet};
use crate::resolver::reconstruct::TempClone;
use crate::util::config::STD_ROOT_PLACEHOLDER;
use crate::util::fs::read;
use crate::util::Config;

/// Rewrites module directories, package paths and position tables.
pub struct PathRewriter<'a> {
    clone: &'a TempClone,
    original: &'a Path,
    /// Import-only files, already expressed under `original`
    synthetic: &'a BTreeSet<PathBuf>,
    config: &'a Config,
    std_root: Option<PathBuf>,
}

impl<'a> PathRewriter<'a> {
    pub fn new(
        clone: &'a TempClone,
        original: &'a Path,
        synthetic: &'a BTreeSet<PathBuf>,
        config: &'a Config,
    ) -> Self {
        PathRewriter {
            clone,
            original,
            synthetic,
            config,
            std_root: None,
        }
    }

    /// Rewrite `packages` in place.
    ///
    /// Root packages get a rebuilt position table; tables shared between roots
    /// are rebuilt once and stay shared. A file that cannot be read aborts the
    /// rewrite.
    pub fn rewrite(&mut self, packages: &mut PackageSet) -> Result<()> {
        let mut rebuilt: HashMap<*const FileSet, Arc<FileSet>> = HashMap::new();
        let roots = packages.roots().to_vec();

        for &id in &roots {
            if let Some(module) = packages.package(id).module {
                let module = packages.module_mut(module);
                module.dir = self.original.to_path_buf();
                if let Some(manifest) = module.manifest.take() {
                    module.manifest = Some(self.real_path(&manifest));
                }
            }

            let fset = Arc::clone(&packages.package(id).fset);
            let key = Arc::as_ptr(&fset);
            let table = match rebuilt.get(&key) {
                Some(table) => Arc::clone(table),
                None => {
                    let table = Arc::new(self.rebuild(&fset)?);
                    rebuilt.insert(key, Arc::clone(&table));
                    table
                }
            };
            packages.package_mut(id).fset = table;
        }

        let ids: Vec<_> = packages.package_ids().collect();
        for id in ids {
            let pkg = packages.package_mut(id);
            if let Some(dir) = pkg.dir.take() {
                pkg.dir = Some(self.real_path(&dir));
            }
            let files = std::mem::take(&mut pkg.files);
            pkg.files = files
                .iter()
                .map(|file| self.real_path(file))
                .filter(|file| !self.synthetic.contains(file))
                .collect();
        }

        tracing::debug!(
            "rewrote {} root packages onto {}",
            roots.len(),
            self.original.display()
        );
        Ok(())
    }

    /// Rebuild a position table with file names under the original module.
    ///
    /// Bases and sizes are kept; line tables are recomputed from the content
    /// actually read.
    fn rebuild(&mut self, fset: &FileSet) -> Result<FileSet> {
        let mut table = FileSet::new();
        for file in fset.iter() {
            let name = self.real_path(file.name());
            if self.synthetic.contains(&name) {
                continue;
            }
            let content = read(&self.source_path(file.name())?)?;
            table
                .add_file(name, file.base(), file.size())?
                .set_lines_for_content(&content);
        }
        Ok(table)
    }

    /// Where a recorded file actually lives, with the standard library
    /// placeholder expanded.
    fn source_path(&mut self, name: &Path) -> Result<PathBuf> {
        match name.strip_prefix(STD_ROOT_PLACEHOLDER) {
            Ok(rest) => Ok(self.std_root()?.join(rest)),
            Err(_) => Ok(name.to_path_buf()),
        }
    }

    fn std_root(&mut self) -> Result<&Path> {
        if self.std_root.is_none() {
            self.std_root = Some(self.config.std_root()?);
        }
        Ok(self.std_root.as_deref().unwrap_or(Path::new("")))
    }

    /// The name a file should carry: moved under the original module if it
    /// lies in the clone, unchanged otherwise.
    fn real_path(&self, path: &Path) -> PathBuf {
        self.clone
            .rebase(path, self.original)
            .unwrap_or_else(|| path.to_path_buf())
    }
}
