//! Loading packages with a target package guaranteed to be in the graph.

use anyhow::{bail, Result};

use crate::core::PackageSet;
use crate::loader::PackageLoader;
use crate::resolver::{is_reachable_with, DependencyFetcher, Reconstructor};
use crate::util::Config;

/// Result of [`load`].
#[derive(Debug)]
pub struct Loaded {
    /// Packages matched by the patterns, with the target in their graph
    pub packages: PackageSet,

    /// Whether the target was reachable from the initial load
    pub reachable: bool,
}

/// Load `patterns` so that the package `target` is part of the graph.
///
/// If the initial load already reaches `target` it is returned as is.
/// Otherwise the owning module is rebuilt with `target` added as a dependency.
pub fn load(
    target: &str,
    patterns: &[String],
    loader: &dyn PackageLoader,
    fetcher: &dyn DependencyFetcher,
    config: &Config,
) -> Result<Loaded> {
    if target.is_empty() {
        bail!("target package path must not be empty");
    }
    if patterns.is_empty() {
        bail!("at least one package pattern is required");
    }

    let packages = loader.load(config.load_dir(), patterns)?;
    tracing::debug!("initial load: {} packages", packages.len());

    if is_reachable_with(target, &packages, config.search) {
        tracing::info!("{} is already imported", target);
        return Ok(Loaded {
            packages,
            reachable: true,
        });
    }

    tracing::info!("{} is not imported; rebuilding the module", target);
    let packages = Reconstructor::new(loader, fetcher, config).resolve(target, &packages, patterns)?;

    Ok(Loaded {
        packages,
        reachable: false,
    })
}
