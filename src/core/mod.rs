//! Core data model: packages, modules and position tables.

pub mod fileset;
pub mod module;
pub mod package;

pub use fileset::{FileSet, FileSetError, Position, SourceFile};
pub use module::{Module, ModuleId};
pub use package::{Package, PackageId, PackageSet};
