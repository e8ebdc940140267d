//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to the repository. Every read the
//! crate performs goes through [`Git`], which returns strong types and
//! normalizes libgit2 failures into typed [`GitError`] categories.
//!
//! # Read-only
//!
//! No method mutates the repository. Refs, objects, the index and the
//! worktree are only ever inspected.
//!
//! # Absence vs. failure
//!
//! States that are normal for a repository (unborn HEAD, detached HEAD, no
//! reachable tag) are reported as `Ok(None)`. Only genuine failures come
//! back as `Err`.
//!
//! # Example
//!
//! ```ignore
//! use gitfacts::git::{DescribeSettings, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(head) = git.head()? {
//!     println!("HEAD is at {}", head.oid.short(7));
//! }
//! println!("{:?}", git.describe(&DescribeSettings::default())?);
//! ```

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use crate::core::types::{Oid, Ref, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context == "HEAD" || context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ if err.class() == git2::ErrorClass::Os => GitError::AccessError {
                message: format!("{}: {}", context, err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Whether this error describes an expected absence rather than a
    /// failure.
    pub fn is_absence(&self) -> bool {
        matches!(self, GitError::NotARepo { .. } | GitError::RefNotFound { .. })
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
        }
    }
}

/// How [`Git::describe`] formats its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeSettings {
    /// Abbreviated object id length
    pub abbrev: u32,
    /// Emit `<tag>-<distance>-g<id>` even when HEAD is exactly on a tag
    pub always_long: bool,
    /// Appended when tracked files have uncommitted changes
    pub dirty_suffix: Option<String>,
    /// Only consider tags matching this glob
    pub pattern: Option<String>,
}

impl Default for DescribeSettings {
    fn default() -> Self {
        Self {
            abbrev: 7,
            always_long: true,
            dirty_suffix: None,
            pattern: None,
        }
    }
}

/// The Git interface.
///
/// Wraps one opened `git2::Repository`. libgit2 repositories may move
/// between threads but are not safe to share, so access is serialized
/// through a mutex; every method holds the lock only for its own duration.
pub struct Git {
    repo: Mutex<git2::Repository>,
    git_dir: PathBuf,
    common_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("path", &self.git_dir).finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository. Bare repositories are accepted.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::AccessError`] / [`GitError::Internal`] if one was found
    ///   but could not be opened
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::NotARepo {
                path: path.to_path_buf(),
            },
            _ => GitError::from_git2(e, &path.display().to_string()),
        })?;

        let git_dir = repo.path().to_path_buf();
        let common_dir = repo.commondir().to_path_buf();

        Ok(Self {
            repo: Mutex::new(repo),
            git_dir,
            common_dir,
        })
    }

    /// The `.git` directory (per-worktree for linked worktrees).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The directory holding shared refs and objects.
    ///
    /// Same as [`Git::git_dir`] except in linked worktrees.
    pub fn common_dir(&self) -> &Path {
        &self.common_dir
    }

    // =========================================================================
    // HEAD
    // =========================================================================

    /// Resolve HEAD.
    ///
    /// Returns the HEAD ref with its leaf id and whether it is symbolic.
    /// Returns `None` if HEAD is missing or unborn (a repository with no
    /// commits).
    pub fn head(&self) -> Result<Option<Ref>, GitError> {
        let repo = self.repo.lock();
        let Some(head) = find_reference(&repo, "HEAD")? else {
            return Ok(None);
        };
        let symbolic = head.kind() == Some(git2::ReferenceType::Symbolic);

        let Some(oid) = leaf_target(&head, "HEAD")? else {
            return Ok(None);
        };

        Ok(Some(Ref {
            name: RefName::head(),
            oid,
            symbolic,
        }))
    }

    /// Resolve the ref that symbolic HEAD points to.
    ///
    /// Returns `None` if HEAD is missing, detached, or points at a branch
    /// that does not exist yet.
    pub fn head_target(&self) -> Result<Option<Ref>, GitError> {
        let repo = self.repo.lock();
        let Some(head) = find_reference(&repo, "HEAD")? else {
            return Ok(None);
        };
        let Some(target) = head.symbolic_target() else {
            return Ok(None); // Detached HEAD
        };
        let name = RefName::new(target)?;

        let Some(reference) = find_reference(&repo, name.as_str())? else {
            return Ok(None); // Unborn branch
        };
        let symbolic = reference.kind() == Some(git2::ReferenceType::Symbolic);
        let Some(oid) = leaf_target(&reference, name.as_str())? else {
            return Ok(None);
        };

        Ok(Some(Ref {
            name,
            oid,
            symbolic,
        }))
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// List every tag under `refs/tags/`, sorted by full ref name.
    ///
    /// Each entry carries the tag ref's own target: for annotated tags that
    /// is the tag object, not the commit. Use [`Git::peel`] to reach the
    /// tagged object. Tag refs with non-UTF-8 or invalid names are skipped.
    pub fn tags(&self) -> Result<Vec<Ref>, GitError> {
        let repo = self.repo.lock();
        let refs = repo
            .references_glob("refs/tags/*")
            .map_err(|e| GitError::from_git2(e, "refs/tags/"))?;

        let mut tags = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::from_git2(e, "refs/tags/"))?;

            let Some(name) = reference.name() else {
                continue;
            };
            let Ok(name) = RefName::new(name) else {
                continue;
            };
            let symbolic = reference.kind() == Some(git2::ReferenceType::Symbolic);
            let Some(oid) = leaf_target(&reference, name.as_str())? else {
                continue; // Dangling symbolic tag
            };

            tags.push(Ref {
                name,
                oid,
                symbolic,
            });
        }

        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    /// Peel an object id through annotated tags.
    ///
    /// Follows tag objects, any number of layers deep, until a non-tag
    /// object is reached, and returns that object's id. Ids that are not
    /// tag objects are returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if an object in the chain is missing
    pub fn peel(&self, oid: &Oid) -> Result<Oid, GitError> {
        let repo = self.repo.lock();
        let mut id = to_git2(oid)?;
        loop {
            let object = repo
                .find_object(id, None)
                .map_err(|e| GitError::from_git2(e, &id.to_string()))?;
            match object.as_tag() {
                Some(tag) => id = tag.target_id(),
                None => return from_git2_oid(object.id()),
            }
        }
    }

    // =========================================================================
    // Describe and Status
    // =========================================================================

    /// Describe HEAD relative to the nearest reachable tag.
    ///
    /// Lightweight and annotated tags are both candidates. The result looks
    /// like `v1.2.0-3-g1a2b3c4`.
    ///
    /// Returns `None` if HEAD is unborn or no tag is reachable from it.
    pub fn describe(&self, settings: &DescribeSettings) -> Result<Option<String>, GitError> {
        let repo = self.repo.lock();
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };
        // A missing HEAD commit is corruption
        let commit = head.peel_to_commit().map_err(|e| {
            let target = head.target().map(|id| id.to_string());
            GitError::from_git2(e, target.as_deref().unwrap_or("HEAD commit"))
        })?;

        let mut options = git2::DescribeOptions::new();
        options.describe_tags();
        if let Some(pattern) = &settings.pattern {
            options.pattern(pattern);
        }

        let describe = match commit.as_object().describe(&options) {
            Ok(describe) => describe,
            Err(e) if no_candidate_tag(&e) => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "describe")),
        };

        let mut format = git2::DescribeFormatOptions::new();
        format
            .abbreviated_size(settings.abbrev)
            .always_use_long_format(settings.always_long);
        let mut described = describe
            .format(Some(&format))
            .map_err(|e| GitError::from_git2(e, "describe"))?;

        if let Some(suffix) = &settings.dirty_suffix {
            if worktree_dirty(&repo)? == Some(true) {
                described.push_str(suffix);
            }
        }

        Ok(Some(described))
    }

    /// Check whether tracked files have uncommitted changes.
    ///
    /// Untracked and ignored files do not count. Returns `None` for bare
    /// repositories.
    pub fn is_dirty(&self) -> Result<Option<bool>, GitError> {
        let repo = self.repo.lock();
        worktree_dirty(&repo)
    }
}

/// Look up a ref by name, mapping "not found" to `None`.
fn find_reference<'r>(
    repo: &'r git2::Repository,
    name: &str,
) -> Result<Option<git2::Reference<'r>>, GitError> {
    match repo.find_reference(name) {
        Ok(reference) => Ok(Some(reference)),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(GitError::from_git2(e, name)),
    }
}

/// Follow symbolic refs to the object id at the end of the chain.
///
/// `None` when the chain ends at a ref that does not exist.
fn leaf_target(reference: &git2::Reference<'_>, name: &str) -> Result<Option<Oid>, GitError> {
    if let Some(id) = reference.target() {
        return from_git2_oid(id).map(Some);
    }
    match reference.resolve() {
        Ok(resolved) => resolved.target().map(from_git2_oid).transpose(),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(GitError::from_git2(e, name)),
    }
}

/// libgit2 reports "no tags at all" as a generic describe error and "no
/// reachable tag" as `NotFound`. Both mean there is nothing to describe.
fn no_candidate_tag(err: &git2::Error) -> bool {
    err.code() == git2::ErrorCode::NotFound || err.class() == git2::ErrorClass::Describe
}

/// HEAD itself is missing or names a branch with no commits yet.
fn is_unborn(err: &git2::Error) -> bool {
    matches!(
        err.code(),
        git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
    )
}

fn worktree_dirty(repo: &git2::Repository) -> Result<Option<bool>, GitError> {
    if repo.is_bare() {
        return Ok(None);
    }

    let mut options = git2::StatusOptions::new();
    options.include_untracked(false).include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(|e| GitError::from_git2(e, "status"))?;

    Ok(Some(
        statuses
            .iter()
            .any(|entry| entry.status() != git2::Status::CURRENT),
    ))
}

fn from_git2_oid(id: git2::Oid) -> Result<Oid, GitError> {
    Ok(Oid::from_bytes(id.as_bytes())?)
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_bytes(oid.as_bytes()).map_err(|e| GitError::from_git2(e, &oid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn absence_categories() {
            assert!(GitError::NotARepo {
                path: PathBuf::from("/tmp")
            }
            .is_absence());
            assert!(GitError::RefNotFound {
                refname: "HEAD".into()
            }
            .is_absence());
            assert!(!GitError::AccessError {
                message: "denied".into()
            }
            .is_absence());
            assert!(!GitError::Internal {
                message: "oops".into()
            }
            .is_absence());
        }

        #[test]
        fn not_found_context_selects_category() {
            let err = || git2::Error::new(git2::ErrorCode::NotFound, git2::ErrorClass::Reference, "gone");
            assert!(matches!(
                GitError::from_git2(err(), "refs/tags/v1"),
                GitError::RefNotFound { .. }
            ));
            assert!(matches!(
                GitError::from_git2(err(), "HEAD"),
                GitError::RefNotFound { .. }
            ));
            assert!(matches!(
                GitError::from_git2(err(), "abc123"),
                GitError::ObjectNotFound { .. }
            ));
        }

        #[test]
        fn os_errors_are_access_errors() {
            let err = git2::Error::new(
                git2::ErrorCode::GenericError,
                git2::ErrorClass::Os,
                "permission denied",
            );
            let mapped = GitError::from_git2(err, "/repo");
            assert!(matches!(mapped, GitError::AccessError { .. }));
            assert!(mapped.to_string().contains("permission denied"));
        }

        #[test]
        fn type_errors_convert() {
            let err: GitError = TypeError::InvalidRefName("bad".into()).into();
            assert!(matches!(err, GitError::InvalidRefName { .. }));
        }
    }

    #[test]
    fn git2_oid_converts_exactly() {
        let raw = git2::Oid::from_str("abc123def4567890abc123def4567890abc12345").unwrap();
        let oid = from_git2_oid(raw).unwrap();
        assert_eq!(oid.to_string(), raw.to_string());
        assert_eq!(to_git2(&oid).unwrap(), raw);
    }

    #[test]
    fn describe_defaults() {
        let settings = DescribeSettings::default();
        assert_eq!(settings.abbrev, 7);
        assert!(settings.always_long);
        assert!(settings.dirty_suffix.is_none());
    }
}
