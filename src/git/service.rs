//! git::service
//!
//! Repository handle provider.
//!
//! A [`GitService`] keeps one shared [`RepositoryHandle`] per repository,
//! however many directories inside it are asked for. Each directory is
//! looked up at most once. One service is meant to live for one build
//! invocation; [`GitService::close`] (or dropping the service) releases its
//! cached handles, and the underlying libgit2 repository is closed when the
//! last handle is dropped.
//!
//! # Failure policy
//!
//! Opening never fails from the caller's point of view. A directory that is
//! not inside a repository yields `None` quietly; any other open failure is
//! logged at error level and also yields `None`. Both outcomes are
//! memoized, so a broken repository is reported once per build, not once
//! per query.

use std::collections::hash_map::{Entry, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::interface::{Git, GitError};

/// A shared, opened repository.
pub type RepositoryHandle = Arc<Git>;

/// Opens repositories once per directory and caches the result.
#[derive(Debug, Default)]
pub struct GitService {
    cache: Mutex<Cache>,
}

#[derive(Debug, Default)]
struct Cache {
    /// Open result per requested directory
    by_dir: HashMap<PathBuf, Option<RepositoryHandle>>,
    /// One handle per repository, keyed by its git dir
    by_git_dir: HashMap<PathBuf, RepositoryHandle>,
}

impl GitService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the repository containing `dir`, opening it on first request.
    ///
    /// Directories inside the same repository (or worktree) share one
    /// handle. `display_name` identifies the project in log output.
    pub fn git(&self, dir: &Path, display_name: &str) -> Option<RepositoryHandle> {
        let key = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.by_dir.get(&key) {
            return cached.clone();
        }

        let opened = match Git::open(&key) {
            Ok(git) => {
                let git_dir = git
                    .git_dir()
                    .canonicalize()
                    .unwrap_or_else(|_| git.git_dir().to_path_buf());
                match cache.by_git_dir.entry(git_dir) {
                    Entry::Occupied(shared) => Some(Arc::clone(shared.get())),
                    Entry::Vacant(slot) => {
                        tracing::debug!(
                            project = display_name,
                            git_dir = %slot.key().display(),
                            "opened git repository"
                        );
                        Some(Arc::clone(slot.insert(Arc::new(git))))
                    }
                }
            }
            Err(GitError::NotARepo { path }) => {
                tracing::debug!(
                    project = display_name,
                    dir = %path.display(),
                    "no git repository found"
                );
                None
            }
            Err(err) => {
                tracing::error!(
                    project = display_name,
                    dir = %key.display(),
                    error = %err,
                    "failed to open git repository"
                );
                None
            }
        };

        cache.by_dir.insert(key, opened.clone());
        opened
    }

    /// Number of directories with a cached open result.
    pub fn cached(&self) -> usize {
        self.cache.lock().by_dir.len()
    }

    /// Drop every cached handle.
    ///
    /// Handles already given out stay valid until their holders drop them.
    pub fn close(&self) {
        let released = std::mem::take(&mut *self.cache.lock());
        tracing::trace!(count = released.by_git_dir.len(), "released git repositories");
    }
}
