//! CLI entry point for codeask.

mod cli;
mod commands;
mod host;
mod output;

use std::path::Path;

use clap::Parser;
use codeask_observability::ObservabilityConfig;

use crate::cli::Cli;

/// Load env files before anything reads the environment.
/// Order: 1) ~/.codeask/env  2) nearest .codeask/env  3) nearest .env (project root)
/// dotenvy never overrides variables that are already set, so the shell wins,
/// then the global file, then the project files.
fn load_codeask_config() {
    if let Some(config_path) = commands::config::global_env_path() {
        if config_path.exists() {
            let _ = dotenvy::from_path(&config_path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(project_env) = find_upwards(&cwd, Path::new(".codeask/env")) {
            let _ = dotenvy::from_path(&project_env);
        }
        if let Some(env_file) = find_upwards(&cwd, Path::new(".env")) {
            let _ = dotenvy::from_path(&env_file);
        }
    }
}

/// Nearest `relative` in `start` or one of its parents.
fn find_upwards(start: &Path, relative: &Path) -> Option<std::path::PathBuf> {
    start
        .ancestors()
        .take(32)
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env().with_ansi(console::colors_enabled_stderr());
    if config.log_level.is_none() {
        config = config.with_log_level(if verbose { "debug" } else { "warn" });
    }
    if let Err(e) = codeask_observability::init(config) {
        output::warning(&format!("Logging disabled: {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_codeask_config();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    codeask_observability::shutdown();

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
