//! Package graph - loaded packages, their import edges and owning modules.
//!
//! Packages live in a `petgraph` arena; a [`PackageId`] is the identity of a
//! graph vertex. Two packages with the same import path are still different
//! packages if the loader produced two vertices for them.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::core::fileset::FileSet;
use crate::core::module::{Module, ModuleId};

/// Identity of a package vertex within one [`PackageSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub(crate) NodeIndex);

impl PackageId {
    pub(crate) fn node(self) -> NodeIndex {
        self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg#{}", self.0.index())
    }
}

/// A loaded package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Import path
    pub path: String,

    /// Declared package name
    pub name: String,

    /// Source directory, if the package has one on disk
    pub dir: Option<PathBuf>,

    /// Source files that make up the package
    pub files: Vec<PathBuf>,

    /// Owning module; `None` for packages outside any module (standard library)
    pub module: Option<ModuleId>,

    /// Position table for the files this package was parsed from
    pub fset: Arc<FileSet>,
}

impl Package {
    /// Create a package with no files and no module.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Package {
            path: path.into(),
            name: name.into(),
            dir: None,
            files: Vec::new(),
            module: None,
            fset: Arc::new(FileSet::new()),
        }
    }

    /// Set the owning module.
    pub fn in_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    /// Set the source directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }
}

/// A set of loaded packages: the import graph, the modules that own the
/// packages, and the root packages matched by the load patterns.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    /// Edge weight is the position of the import in the importer's list
    graph: DiGraph<Package, usize>,
    modules: Vec<Module>,
    roots: Vec<PackageId>,
}

impl PackageSet {
    /// Create an empty package set.
    pub fn new() -> Self {
        PackageSet::default()
    }

    /// Register a module.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        self.modules.push(module);
        ModuleId((self.modules.len() - 1) as u32)
    }

    /// Add a package vertex.
    pub fn add_package(&mut self, package: Package) -> PackageId {
        PackageId(self.graph.add_node(package))
    }

    /// Add a root package vertex.
    pub fn add_root(&mut self, package: Package) -> PackageId {
        let id = self.add_package(package);
        self.roots.push(id);
        id
    }

    /// Mark an existing package as a root.
    pub fn mark_root(&mut self, id: PackageId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// Append `to` to the import list of `from`.
    pub fn add_import(&mut self, from: PackageId, to: PackageId) {
        let position = self.graph.edges(from.0).count();
        self.graph.add_edge(from.0, to.0, position);
    }

    /// Root packages, in load order.
    pub fn roots(&self) -> &[PackageId] {
        &self.roots
    }

    /// Root packages with their ids.
    pub fn root_packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.roots.iter().map(move |&id| (id, &self.graph[id.0]))
    }

    /// Every package id, roots and dependencies alike.
    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        self.graph.node_indices().map(PackageId)
    }

    /// Get a package.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.graph[id.0]
    }

    /// Get a package mutably.
    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.graph[id.0]
    }

    /// Imports of a package, in the order the importer lists them.
    pub fn imports(&self, id: PackageId) -> Vec<PackageId> {
        let mut edges: Vec<_> = self
            .graph
            .edges(id.0)
            .map(|e| (*e.weight(), PackageId(e.target())))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// First import of a package.
    pub fn first_import(&self, id: PackageId) -> Option<PackageId> {
        self.graph
            .edges(id.0)
            .min_by_key(|e| *e.weight())
            .map(|e| PackageId(e.target()))
    }

    /// Find a package by import path.
    pub fn find(&self, path: &str) -> Option<PackageId> {
        self.graph
            .node_indices()
            .find(|&n| self.graph[n].path == path)
            .map(PackageId)
    }

    /// Get a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// Get a module mutably. Every package owned by the module sees the change.
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }

    /// Module owning a package.
    pub fn module_of(&self, id: PackageId) -> Option<&Module> {
        self.package(id).module.map(|m| self.module(m))
    }

    /// Number of packages (roots and dependencies).
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if the set has no packages.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub(crate) fn graph(&self) -> &DiGraph<Package, usize> {
        &self.graph
    }
}
