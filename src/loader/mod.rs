//! Package loading.
//!
//! The loader turns load patterns into a typed [`PackageSet`]. It is the
//! seam between the resolver and whatever actually parses packages.

pub mod golist;
pub mod imports;

pub use golist::GoListLoader;

use std::path::Path;

use anyhow::Result;

use crate::core::PackageSet;

/// Loads the packages matched by `patterns`.
pub trait PackageLoader {
    /// Load from `dir`, or from the process working directory when `None`.
    fn load(&self, dir: Option<&Path>, patterns: &[String]) -> Result<PackageSet>;
}
