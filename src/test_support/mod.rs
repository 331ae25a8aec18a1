//! Test utilities and fakes for extpkg unit tests.
//!
//! [`DirLoader`] stands in for the module tool's loader: it treats a directory
//! as one module and every directory with `.go` files as one package, reading
//! package clauses and imports straight from the files. [`RecordingFetcher`]
//! stands in for `get`: it records where it ran and which import files it saw.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{DirLoader, ModuleFixture, RecordingFetcher};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     ModuleFixture::new(tmp.path(), "example.com/mod")
//!         .package("b", "b", &[])
//!         .write();
//!
//!     let loader = DirLoader::new("example.com/mod", tmp.path());
//!     let fetcher = RecordingFetcher::new();
//!     // Hand both to a Reconstructor...
//! }
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;

use crate::core::{FileSet, Module, Package, PackageSet};
use crate::loader::imports::HeaderScanner;
use crate::loader::PackageLoader;
use crate::resolver::reconstruct::SYNTHETIC_PREFIX;
use crate::resolver::DependencyFetcher;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Loader that reads packages straight from a directory tree.
#[derive(Debug)]
pub struct DirLoader {
    module_path: String,
    default_dir: PathBuf,
    with_module: bool,
    roots: Option<Vec<String>>,
    calls: Mutex<Vec<Option<PathBuf>>>,
}

impl DirLoader {
    /// Create a loader for module `module_path`, loading from `default_dir`
    /// when no directory is given.
    pub fn new(module_path: &str, default_dir: impl AsRef<Path>) -> Self {
        DirLoader {
            module_path: module_path.to_string(),
            default_dir: default_dir.as_ref().to_path_buf(),
            with_module: true,
            roots: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report packages as not owned by any module.
    pub fn without_module(mut self) -> Self {
        self.with_module = false;
        self
    }

    /// Only report the given import paths as roots; other packages become
    /// plain dependencies.
    pub fn only_roots(mut self, paths: &[&str]) -> Self {
        self.roots = Some(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Directories passed to each `load` call.
    pub fn calls(&self) -> Vec<Option<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }

    fn import_path(&self, root: &Path, dir: &Path) -> String {
        let rel: Vec<_> = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if rel.is_empty() {
            self.module_path.clone()
        } else {
            format!("{}/{}", self.module_path, rel.join("/"))
        }
    }

    fn is_root(&self, path: &str) -> bool {
        match self.roots {
            Some(ref roots) => roots.iter().any(|r| r == path),
            None => true,
        }
    }
}

impl PackageLoader for DirLoader {
    fn load(&self, dir: Option<&Path>, _patterns: &[String]) -> Result<PackageSet> {
        self.calls.lock().unwrap().push(dir.map(Path::to_path_buf));
        let root = dir.unwrap_or(&self.default_dir).to_path_buf();

        let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "go") {
                let parent = path.parent().unwrap_or(&root).to_path_buf();
                groups.entry(parent).or_default().push(path.to_path_buf());
            }
        }

        let mut set = PackageSet::new();
        let module = self.with_module.then(|| {
            set.add_module(
                Module::new(&self.module_path, &root)
                    .main()
                    .with_manifest(root.join("go.mod")),
            )
        });

        let scanner = HeaderScanner::new()?;
        let mut by_path = HashMap::new();
        let mut scanned = Vec::new();
        for (dir, files) in &groups {
            let mut name = None;
            let mut imports: Vec<String> = Vec::new();
            for file in files {
                let header = scanner.scan(&fs::read_to_string(file)?);
                name = name.or(header.package);
                for import in header.imports {
                    if !imports.contains(&import) {
                        imports.push(import);
                    }
                }
            }

            let path = self.import_path(&root, dir);
            let name = name.unwrap_or_else(|| path.rsplit('/').next().unwrap_or("").to_string());
            let mut package = Package::new(&path, name).with_dir(dir);
            package.module = module;
            package.files = files.clone();

            let id = if self.is_root(&path) {
                set.add_root(package)
            } else {
                set.add_package(package)
            };
            by_path.insert(path, id);
            scanned.push((id, imports));
        }

        for (id, imports) in scanned {
            for import in imports {
                let dep = match by_path.get(&import) {
                    Some(&dep) => dep,
                    None => {
                        let name = import.rsplit('/').next().unwrap_or(&import).to_string();
                        let dep = set.add_package(Package::new(&import, name));
                        by_path.insert(import, dep);
                        dep
                    }
                };
                set.add_import(id, dep);
            }
        }

        let mut fset = FileSet::new();
        let roots = set.roots().to_vec();
        for &id in &roots {
            for file in set.package(id).files.clone() {
                fset.push_file(file.clone(), &fs::read(&file)?)?;
            }
        }
        let fset = Arc::new(fset);
        for id in roots {
            set.package_mut(id).fset = Arc::clone(&fset);
        }

        Ok(set)
    }
}

/// Fetcher that records its calls instead of running the module tool.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    fail: Option<String>,
    calls: Mutex<Vec<(PathBuf, String)>>,
    synthetic: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        RecordingFetcher::default()
    }

    /// A fetcher whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        RecordingFetcher {
            fail: Some(message.to_string()),
            ..RecordingFetcher::default()
        }
    }

    /// `(module_dir, target)` of each call.
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Import files present in the module directory during the last call,
    /// with their contents.
    pub fn synthetic_files(&self) -> Vec<(PathBuf, String)> {
        self.synthetic.lock().unwrap().clone()
    }
}

impl DependencyFetcher for RecordingFetcher {
    fn fetch(&self, module_dir: &Path, target: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((module_dir.to_path_buf(), target.to_string()));

        let mut seen = Vec::new();
        for entry in WalkDir::new(module_dir).sort_by_file_name() {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_file() && name.starts_with(SYNTHETIC_PREFIX) {
                seen.push((entry.path().to_path_buf(), fs::read_to_string(entry.path())?));
            }
        }
        *self.synthetic.lock().unwrap() = seen;

        if let Some(ref message) = self.fail {
            return Err(anyhow!("{}", message));
        }

        let manifest = module_dir.join("go.mod");
        let mut contents = fs::read_to_string(&manifest).unwrap_or_default();
        contents.push_str(&format!("\nrequire {} v0.1.0\n", target));
        fs::write(&manifest, contents)?;
        Ok(())
    }
}
