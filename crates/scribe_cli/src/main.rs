//! CLI entry point for scribe.

mod cli;
mod commands;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use scribe_observability::ObservabilityConfig;

use crate::cli::Cli;

/// First `name` found in `start` or one of its ancestors.
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .take(32)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Load env files into the process environment.
/// Variables already set win over file values (dotenvy never overrides).
/// Order: 1) .scribe/env (project)  2) .env (project root)  3) ~/.scribe/env
fn load_scribe_env() {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(project_env) = find_upwards(&cwd, ".scribe/env") {
            let _ = dotenvy::from_path(&project_env);
        }
        if let Some(env_file) = find_upwards(&cwd, ".env") {
            let _ = dotenvy::from_path(&env_file);
        }
    }
    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(".scribe").join("env");
        if config_path.exists() {
            let _ = dotenvy::from_path(&config_path);
        }
    }
}

fn init_logging(verbose: bool) {
    // Logs go to stderr so `-o json` output on stdout stays machine-readable.
    let mut config = ObservabilityConfig::from_env()
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_stderr(true);
    if verbose {
        config = config.with_log_level("debug");
    } else if config.log_level.is_none() {
        config = config.with_log_level("warn");
    }
    if let Err(e) = scribe_observability::init(config) {
        output::warning(&format!("logging disabled: {e}"));
    }
}

#[tokio::main]
async fn main() {
    load_scribe_env();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    scribe_observability::shutdown();

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
