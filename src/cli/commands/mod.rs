//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler takes an already-built [`GitFacts`] and prints one or more
//! facts. Handlers never open the repository themselves; observing a fact
//! does that lazily.

mod cargo_env;
mod completion;
mod facts;

// Re-export command functions for testing and direct invocation
pub use cargo_env::cargo_env;
pub use completion::completion;
pub use facts::{branch, branch_ref, commit, describe, head_tag, show, tags};

use std::sync::Arc;

use anyhow::Result;

use super::args::Command;
use super::Context;
use crate::core::config::Config;
use crate::git::GitService;
use crate::query::GitFacts;

/// Config and facts for the target directory.
struct Session {
    config: Config,
    facts: GitFacts,
}

impl Session {
    fn open(ctx: &Context) -> Result<Self> {
        let config = Config::load(Some(&ctx.dir))?;
        tracing::debug!(
            global = ?config.global_file(),
            project = ?config.project_file(),
            "loaded config"
        );

        let service = Arc::new(GitService::new());
        let facts = GitFacts::from_config(service, &ctx.dir, ctx.name.as_str(), &config)?;
        Ok(Self { config, facts })
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Completion { shell } => completion(shell),
        Command::Branch => branch(&Session::open(ctx)?.facts),
        Command::BranchRef => branch_ref(&Session::open(ctx)?.facts),
        Command::Commit { short } => {
            let session = Session::open(ctx)?;
            commit(&session.facts, short.then(|| session.config.abbrev()))
        }
        Command::Tags { long } => tags(&Session::open(ctx)?.facts, long),
        Command::HeadTag => head_tag(&Session::open(ctx)?.facts),
        Command::Describe => describe(&Session::open(ctx)?.facts),
        Command::Show { json } => show(&Session::open(ctx)?.facts, json),
        Command::CargoEnv => {
            let session = Session::open(ctx)?;
            cargo_env(&session.facts, &session.config)
        }
    }
}
