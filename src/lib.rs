//! extpkg - load a package graph that includes a package it does not import yet.
//!
//! The loaded packages are checked for the target package first. When the
//! target is missing, the owning module is copied to a scratch directory,
//! the target is added as a dependency there, and the packages are loaded
//! again with every path pointing back at the original module.

pub mod core;
pub mod loader;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and fakes for extpkg unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides an in-process loader and a recording fetcher so the resolver can
/// run without the module tool.
#[cfg(test)]
pub mod test_support;

pub use core::{FileSet, Module, Package, PackageId, PackageSet};
pub use loader::{GoListLoader, PackageLoader};
pub use ops::load::{load, Loaded};
pub use resolver::{is_reachable, DependencyFetcher, ModuleGet, ResolveError, SearchMode};
pub use util::Config;
