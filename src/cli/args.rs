//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--dir <path>`: Inspect the repository containing this directory
//! - `--name <name>`: Project name used in log output
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitfacts - Print git repository facts for builds and scripts
#[derive(Parser, Debug)]
#[command(name = "gitfacts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Inspect the repository containing this directory
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Project name used in log output (default: directory name)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
///
/// Query commands print nothing and exit successfully when the fact is
/// absent (no repository, detached HEAD, no tags, ...).
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the short name of the checked-out branch
    Branch,

    /// Print the full ref of the checked-out branch
    #[command(name = "branch-ref")]
    BranchRef,

    /// Print the commit HEAD resolves to
    Commit {
        /// Abbreviate to the configured length
        #[arg(long)]
        short: bool,
    },

    /// List tags, one per line
    Tags {
        /// Print the object id and full ref name
        #[arg(long)]
        long: bool,
    },

    /// Print the tag pointing at HEAD, if any
    #[command(name = "head-tag")]
    HeadTag,

    /// Describe HEAD relative to the nearest tag
    #[command(
        long_about = "Describe HEAD relative to the nearest reachable tag.\n\n\
            Both lightweight and annotated tags are considered. Output always \
            uses the long form <tag>-<distance>-g<id> unless describe.always_long \
            is disabled in .gitfacts.toml."
    )]
    Describe,

    /// Print every fact at once
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print cargo:rustc-env directives for a build script
    #[command(
        name = "cargo-env",
        after_help = "\
EXAMPLES:
    # In build.rs, shelling out instead of using the library:
    #   std::process::Command::new(\"gitfacts\").arg(\"cargo-env\")
    gitfacts cargo-env --dir ."
    )]
    CargoEnv,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gitfacts", "commit", "--short", "--dir", "/tmp", "--debug"])
            .unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp")));
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Commit { short: true }));
    }

    #[test]
    fn kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["gitfacts", "head-tag"]).unwrap();
        assert!(matches!(cli.command, Command::HeadTag));
        let cli = Cli::try_parse_from(["gitfacts", "cargo-env"]).unwrap();
        assert!(matches!(cli.command, Command::CargoEnv));
    }
}
