//! extpkg CLI - check whether a package is imported, and load it if not.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use extpkg::{Config, GoListLoader, ModuleGet};

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for the answer
    let filter = if cli.verbose {
        EnvFilter::new("extpkg=debug")
    } else {
        EnvFilter::new("extpkg=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::default()
        .with_tool(&cli.go)
        .with_search(cli.search.into());
    config.std_root = cli.goroot.filter(|root| !root.as_os_str().is_empty());
    config.temp_root = cli.tmpdir;
    config.cwd = cli.dir;

    let tool = config.tool_path();
    let loader = GoListLoader::new(&tool);
    let fetcher = ModuleGet::new(&tool);

    let loaded = extpkg::load(&cli.target, &cli.patterns, &loader, &fetcher, &config)?;
    println!("{}", loaded.reachable);
    Ok(())
}
