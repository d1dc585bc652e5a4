//! Validate endpoint tables and list the chains they make available.
//!
//! Usage:
//!   validate-paths [<file-or-dir>...]
//!
//! Without arguments the table named by `REST_CHAIN_PATHS_FILE` is checked,
//! falling back to `api_paths.json` in the working directory.

use anyhow::{bail, Context};
use rest_chain::paths::PathTable;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut targets: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if targets.is_empty() {
        let default = std::env::var("REST_CHAIN_PATHS_FILE").unwrap_or_else(|_| "api_paths.json".to_string());
        targets.push(PathBuf::from(default));
    }

    let mut failures = Vec::new();
    for target in &targets {
        match load(target) {
            Ok(table) => print_table(target, &table),
            Err(e) => {
                println!("{}: invalid", target.display());
                failures.push(format!("  {}: {:#}", target.display(), e));
            }
        }
    }

    if !failures.is_empty() {
        eprintln!("\n{} table(s) failed validation:", failures.len());
        for failure in &failures {
            eprintln!("{}", failure);
        }
        bail!("validation failed");
    }
    Ok(())
}

fn load(target: &Path) -> anyhow::Result<PathTable> {
    let table = if target.is_dir() {
        PathTable::load_dir(target)
    } else {
        PathTable::load(target)
    };
    table.with_context(|| format!("loading {}", target.display()))
}

fn print_table(target: &Path, table: &PathTable) {
    println!("{}: {} endpoint(s)", target.display(), table.len());
    let width = table.iter().map(|e| e.id.len()).max().unwrap_or(0);
    for endpoint in table.iter() {
        let chain = endpoint.id.replace('_', "->");
        println!(
            "  {:<width$}  {:<6} {}  ({})",
            endpoint.id,
            endpoint.verb,
            endpoint.path,
            chain,
            width = width
        );
    }
}
