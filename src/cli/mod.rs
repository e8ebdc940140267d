//! cli
//!
//! Command-line interface layer for gitfacts.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the process-wide log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`crate::query::GitFacts`] for the target directory and prints what the
//! command asks for. The library never installs a subscriber; only this
//! layer does.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "GITFACTS_LOG";

/// Resolved global options.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory whose repository is inspected
    pub dir: PathBuf,
    /// Project name used in log output
    pub name: String,
}

impl Context {
    /// Resolve global flags against the current directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let dir = match &cli.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        let name = cli.name.clone().unwrap_or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "project".to_string())
        });

        Ok(Self { dir, name })
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context::from_cli(&cli)?;
    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber.
///
/// `$GITFACTS_LOG` takes an `EnvFilter` directive and wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "gitfacts=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
