//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use extpkg::SearchMode;

/// Report whether a package is already imported by the packages matched by
/// the given patterns, and load it into their module if it is not.
#[derive(Parser)]
#[command(name = "extpkg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Module tool used to list packages and fetch dependencies
    #[arg(long, env = "EXTPKG_GO", default_value = "go")]
    pub go: PathBuf,

    /// Standard library root (asked from the module tool if unset)
    #[arg(long, env = "GOROOT")]
    pub goroot: Option<PathBuf>,

    /// How to walk the import graph when checking for the target
    #[arg(long, value_enum, default_value_t = Search::Transitive)]
    pub search: Search,

    /// Directory for temporary module copies
    #[arg(long, env = "EXTPKG_TMPDIR")]
    pub tmpdir: Option<PathBuf>,

    /// Load packages from this directory instead of the current one
    #[arg(short = 'C', long = "dir")]
    pub dir: Option<PathBuf>,

    /// Import path of the package that must be in the graph
    pub target: String,

    /// Package patterns to load
    #[arg(required = true)]
    pub patterns: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Search {
    /// Follow every import
    Transitive,
    /// Follow only the first import of each package
    FirstImport,
}

impl From<Search> for SearchMode {
    fn from(search: Search) -> Self {
        match search {
            Search::Transitive => SearchMode::Transitive,
            Search::FirstImport => SearchMode::FirstImport,
        }
    }
}
