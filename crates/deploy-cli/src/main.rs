//! svn-deploy CLI
//!
//! Idempotently deploys a Subversion checkout or export to a directory.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use deploy_core::ConfigResolver;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use error::Result;

/// Overrides the directory holding the global `config.toml`.
const CONFIG_DIR_ENV: &str = "SVN_DEPLOY_CONFIG_DIR";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to stderr; `-v` enables debug output, otherwise `RUST_LOG` or warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
    tracing::debug!("Verbose mode enabled");
}

fn run(cli: Cli) -> Result<()> {
    let mut resolver = ConfigResolver::new().with_working_dir(std::env::current_dir()?);
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        resolver = resolver.with_global_config_dir(dir);
    }
    if let Some(config) = &cli.config {
        resolver = resolver.with_request_file(config);
    }
    let request = resolver.resolve(cli.overrides())?;

    if cli.check {
        commands::run_check(&request, cli.json)
    } else {
        commands::run_deploy(&request, cli.json)
    }
}
