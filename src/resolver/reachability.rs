//! Reachability of an import path from a set of loaded packages.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use petgraph::visit::Dfs;

use crate::core::{PackageId, PackageSet};

/// How the import graph is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Follow every import edge.
    #[default]
    Transitive,

    /// Legacy walk: only the first import edge of each package is followed.
    ///
    /// This misses targets that hang off a later import and exists for
    /// callers that need answers identical to older releases.
    FirstImport,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Transitive => write!(f, "transitive"),
            SearchMode::FirstImport => write!(f, "first-import"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transitive" => Ok(SearchMode::Transitive),
            "first-import" => Ok(SearchMode::FirstImport),
            _ => Err(format!(
                "invalid search mode '{}'; expected 'transitive' or 'first-import'",
                s
            )),
        }
    }
}

/// Check whether `target` is one of the root packages or in their imports.
pub fn is_reachable(target: &str, packages: &PackageSet) -> bool {
    is_reachable_with(target, packages, SearchMode::Transitive)
}

/// Check reachability with an explicit search mode.
///
/// Every package is visited at most once per call; the visited set is shared
/// by all roots, so cyclic and diamond-shaped graphs terminate.
pub fn is_reachable_with(target: &str, packages: &PackageSet, mode: SearchMode) -> bool {
    match mode {
        SearchMode::Transitive => transitive(target, packages),
        SearchMode::FirstImport => {
            let mut visited = HashSet::new();
            packages
                .roots()
                .iter()
                .any(|&root| first_import_chain(target, packages, root, &mut visited))
        }
    }
}

fn transitive(target: &str, packages: &PackageSet) -> bool {
    let graph = packages.graph();
    let mut dfs = Dfs::empty(graph);
    for root in packages.roots() {
        dfs.move_to(root.node());
        while let Some(node) = dfs.next(graph) {
            if graph[node].path == target {
                return true;
            }
        }
    }
    false
}

fn first_import_chain(
    target: &str,
    packages: &PackageSet,
    start: PackageId,
    visited: &mut HashSet<PackageId>,
) -> bool {
    let mut current = Some(start);
    while let Some(id) = current {
        if !visited.insert(id) {
            return false;
        }
        if packages.package(id).path == target {
            return true;
        }
        current = packages.first_import(id);
    }
    false
}
