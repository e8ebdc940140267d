//! git
//!
//! Single interface for all Git reads.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. Everything above this layer sees strong types ([`Oid`],
//! [`RefName`], [`Ref`]) and typed [`GitError`]s.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening, memoized per build ([`GitService`])
//! - HEAD resolution, symbolic and detached
//! - Tag enumeration and peeling through annotated tags
//! - Describe and worktree status
//!
//! # Invariants
//!
//! - No operation writes to the repository
//! - Expected absences (unborn HEAD, detached HEAD) are `Ok(None)`, not errors
//!
//! # Example
//!
//! ```ignore
//! use gitfacts::git::GitService;
//! use std::path::Path;
//!
//! let service = GitService::new();
//! if let Some(git) = service.git(Path::new("."), "my-project") {
//!     for tag in git.tags()? {
//!         println!("{}", tag.short_name());
//!     }
//! }
//! ```
//!
//! [`Oid`]: crate::core::types::Oid
//! [`RefName`]: crate::core::types::RefName
//! [`Ref`]: crate::core::types::Ref

mod interface;
mod service;

pub use interface::{DescribeSettings, Git, GitError};
pub use service::{GitService, RepositoryHandle};
