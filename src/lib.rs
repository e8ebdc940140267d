//! gitfacts - Lazy, failure-tolerant git repository facts for build logic
//!
//! gitfacts exposes the current branch, HEAD commit, tags, the tag at HEAD
//! and a `git describe` string to build scripts and tooling. Every fact is
//! computed lazily, at most once, and never fails: a missing or broken
//! repository degrades to empty values and a logged error.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, prints facts)
//! - [`build`] - `cargo:rustc-env` emission for build scripts
//! - [`query`] - The [`query::GitFacts`] facade and head-tag resolution
//! - [`git`] - Single interface for all Git reads, and the handle provider
//! - [`core`] - Strong types, deferred values and configuration
//!
//! # Invariants
//!
//! 1. Nothing ever writes to the repository
//! 2. A repository is opened at most once per [`git::GitService`]
//! 3. No query returns an error; failures are logged and become absence
//! 4. Expected states (no repository, unborn or detached HEAD) are never
//!    logged as errors

pub mod build;
pub mod cli;
pub mod core;
pub mod git;
pub mod query;
