//! Module - the build unit that owns packages.

use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a module within one [`PackageSet`](crate::core::PackageSet).
///
/// Two packages belong to the same module iff they carry the same `ModuleId`;
/// the module path alone is not enough (a module can be loaded twice from
/// different directories).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// A module as reported by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module path (e.g. `example.com/mod`)
    pub path: String,

    /// Root directory on disk
    pub dir: PathBuf,

    /// Module definition file, if the loader reported one
    pub manifest: Option<PathBuf>,

    /// Whether this is the main module of the load
    pub main: bool,
}

impl Module {
    /// Create a module rooted at `dir`.
    pub fn new(path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Module {
            path: path.into(),
            dir: dir.into(),
            manifest: None,
            main: false,
        }
    }

    /// Mark this module as the main module.
    pub fn main(mut self) -> Self {
        self.main = true;
        self
    }

    /// Set the module definition file.
    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// Get the root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Module path with separators made safe for a file name.
    pub fn sanitized_path(&self) -> String {
        self.path
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '-',
                c => c,
            })
            .collect()
    }
}
