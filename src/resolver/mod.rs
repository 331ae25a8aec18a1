//! Dependency resolution.
//!
//! Answers whether a package is already in the import graph of the loaded
//! packages and, when it is not, rebuilds the owning module with the package
//! added as a dependency.

pub mod errors;
pub mod fetch;
pub mod reachability;
pub mod reconstruct;
pub mod rewrite;

pub use errors::ResolveError;
pub use fetch::{DependencyFetcher, ModuleGet};
pub use reachability::{is_reachable, is_reachable_with, SearchMode};
pub use reconstruct::{owning_module, Reconstructor};
