//! cargo-env command - Print build-script directives

use std::io::Write;

use anyhow::{Context as _, Result};

use crate::build::write_cargo_env;
use crate::core::config::Config;
use crate::query::GitFacts;

/// Print `cargo:rustc-env` and `cargo:rerun-if-changed` directives.
pub fn cargo_env(facts: &GitFacts, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_cargo_env(facts, &config.env_prefix(), config.abbrev(), &mut out)
        .context("failed to write cargo directives")?;
    out.flush()?;
    Ok(())
}
