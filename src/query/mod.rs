//! query
//!
//! Lazy, failure-tolerant repository facts.
//!
//! # Overview
//!
//! [`GitFacts`] answers read-only questions about a project's repository:
//! tags, the tag at HEAD, describe, branch and HEAD commit. Every answer is
//! a [`Deferred`] value. Nothing touches the filesystem until a value is
//! observed, and each value is computed at most once per facade.
//!
//! # Failure policy
//!
//! Queries never fail. Without a repository every query is empty or
//! absent and git is never called. A git failure is logged at error level
//! (parented to the facade's span, which carries the project name) and the
//! query degrades to its empty/absent value. Expected states such as an
//! unborn or detached HEAD are absent without any error being logged.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitfacts::git::GitService;
//! use gitfacts::query::GitFacts;
//!
//! let service = Arc::new(GitService::new());
//! let facts = GitFacts::new(service, ".", "my-project").unwrap();
//!
//! let version = facts.describe().map(|d| d.clone().unwrap_or_else(|| "0.0.0".into()));
//! println!("building {} on {:?}", version.get(), facts.branch_name().get());
//! ```

pub mod head_tag;
mod snapshot;

pub use snapshot::RepoSnapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::Span;

use crate::core::config::Config;
use crate::core::lazy::Deferred;
use crate::core::types::{Oid, Ref};
use crate::git::{DescribeSettings, Git, GitError, GitService, RepositoryHandle};

/// Errors constructing a [`GitFacts`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("project display name cannot be empty")]
    EmptyDisplayName,
}

/// Read-only repository facts for one project directory.
///
/// Cloning is cheap and clones share memoized results.
#[derive(Debug, Clone)]
pub struct GitFacts {
    project_dir: PathBuf,
    display_name: String,
    span: Span,
    git: Deferred<Option<RepositoryHandle>>,
    tags: Deferred<Vec<Ref>>,
    head_tag: Deferred<Option<Ref>>,
    describe: Deferred<Option<String>>,
    branch: Deferred<Option<Ref>>,
    branch_name: Deferred<Option<String>>,
    commit: Deferred<Option<Oid>>,
    dirty: Deferred<Option<bool>>,
    snapshot: Deferred<RepoSnapshot>,
}

impl GitFacts {
    /// Create a facade with default describe settings.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyDisplayName`] if `display_name` is blank.
    pub fn new(
        service: Arc<GitService>,
        project_dir: impl Into<PathBuf>,
        display_name: impl Into<String>,
    ) -> Result<Self, QueryError> {
        Self::with_settings(
            service,
            project_dir,
            display_name,
            DescribeSettings::default(),
        )
    }

    /// Create a facade whose describe output follows `config`.
    pub fn from_config(
        service: Arc<GitService>,
        project_dir: impl Into<PathBuf>,
        display_name: impl Into<String>,
        config: &Config,
    ) -> Result<Self, QueryError> {
        Self::with_settings(
            service,
            project_dir,
            display_name,
            config.describe_settings(),
        )
    }

    /// Create a facade with explicit describe settings.
    pub fn with_settings(
        service: Arc<GitService>,
        project_dir: impl Into<PathBuf>,
        display_name: impl Into<String>,
        settings: DescribeSettings,
    ) -> Result<Self, QueryError> {
        let project_dir = project_dir.into();
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(QueryError::EmptyDisplayName);
        }

        let span = tracing::error_span!("gitfacts", project = %display_name);

        let git = {
            let dir = project_dir.clone();
            let name = display_name.clone();
            Deferred::new(move || service.git(&dir, &name))
        };

        let tags = repo_query(&git, &span, "a list of tags", |git| git.tags().map(Some))
            .map(|tags| tags.clone().unwrap_or_default());

        let head_tag = repo_query(&git, &span, "the current HEAD tag", head_tag::resolve);

        let describe = repo_query(&git, &span, "a 'describe' result", move |git| {
            git.describe(&settings)
        });

        let branch = repo_query(&git, &span, "the current branch", Git::head_target);

        let branch_name = branch.map(|branch| branch.as_ref().map(|b| b.short_name().to_string()));

        let commit = repo_query(&git, &span, "the current HEAD commit", |git| {
            Ok(git.head()?.map(|head| head.oid))
        });

        let dirty = repo_query(&git, &span, "the worktree status", Git::is_dirty);

        let snapshot = {
            let (branch, branch_name, commit) = (branch.clone(), branch_name.clone(), commit.clone());
            let (head_tag, describe, dirty, tags) =
                (head_tag.clone(), describe.clone(), dirty.clone(), tags.clone());
            Deferred::new(move || RepoSnapshot {
                branch: branch_name.value(),
                branch_ref: branch.get().as_ref().map(|b| b.name.to_string()),
                commit: commit.get().as_ref().map(Oid::to_string),
                head_tag: head_tag.get().as_ref().map(|t| t.short_name().to_string()),
                describe: describe.value(),
                dirty: dirty.value(),
                tags: tags.get().iter().map(|t| t.short_name().to_string()).collect(),
            })
        };

        Ok(Self {
            project_dir,
            display_name,
            span,
            git,
            tags,
            head_tag,
            describe,
            branch,
            branch_name,
            commit,
            dirty,
            snapshot,
        })
    }

    /// The directory this facade was created for.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The name used for this project in log output.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The span that log events from this facade are parented to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The repository handle, opened on first observation.
    pub fn git(&self) -> Deferred<Option<RepositoryHandle>> {
        self.git.clone()
    }

    /// Every tag, sorted by name. Empty if none or on failure.
    pub fn tags(&self) -> Deferred<Vec<Ref>> {
        self.tags.clone()
    }

    /// The tag whose peeled commit is HEAD's commit, if any.
    pub fn head_tag(&self) -> Deferred<Option<Ref>> {
        self.head_tag.clone()
    }

    /// Describe HEAD, e.g. `v1.2.0-3-g1a2b3c4`.
    ///
    /// Absent in a repository without commits or without a reachable tag.
    pub fn describe(&self) -> Deferred<Option<String>> {
        self.describe.clone()
    }

    /// Short name of the checked-out branch; absent when detached.
    pub fn branch_name(&self) -> Deferred<Option<String>> {
        self.branch_name.clone()
    }

    /// The ref symbolic HEAD points to; absent when detached or unborn.
    pub fn branch(&self) -> Deferred<Option<Ref>> {
        self.branch.clone()
    }

    /// The commit HEAD resolves to, symbolic or detached.
    pub fn commit(&self) -> Deferred<Option<Oid>> {
        self.commit.clone()
    }

    /// Whether tracked files have uncommitted changes.
    pub fn is_dirty(&self) -> Deferred<Option<bool>> {
        self.dirty.clone()
    }

    /// All facts at once.
    pub fn snapshot(&self) -> Deferred<RepoSnapshot> {
        self.snapshot.clone()
    }
}

/// Run `query` against the repository, if there is one.
///
/// This is the one place the failure policy lives: no repository means
/// `None` without calling `query`; an error from `query` becomes `None`,
/// logged at error level unless it only says the thing does not exist.
fn repo_query<V, F>(
    git: &Deferred<Option<RepositoryHandle>>,
    span: &Span,
    what: &'static str,
    query: F,
) -> Deferred<Option<V>>
where
    V: Send + Sync + 'static,
    F: FnOnce(&Git) -> Result<Option<V>, GitError> + Send + 'static,
{
    let span = span.clone();
    git.map(move |handle| {
        let git = handle.as_deref()?;
        query(git).unwrap_or_else(|err| {
            if err.is_absence() {
                tracing::debug!(parent: &span, error = %err, "git has no {what}");
            } else {
                tracing::error!(parent: &span, error = %err, "failed to query git for {what}");
            }
            None
        })
    })
}
