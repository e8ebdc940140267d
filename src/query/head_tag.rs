//! query::head_tag
//!
//! "Is HEAD currently tagged?"
//!
//! Finds the tag whose peeled target is exactly HEAD's commit. Tags are
//! visited in the order [`Git::tags`] yields them (sorted by name) and the
//! first match wins. Annotated tags are peeled through every layer, so a
//! tag of a tag of HEAD still counts.

use crate::core::types::Ref;
use crate::git::{Git, GitError};

/// Find the first tag pointing at HEAD's commit.
///
/// Returns `Ok(None)` when HEAD is unborn or no tag matches.
///
/// # Errors
///
/// Any failure resolving HEAD, listing tags or peeling a tag object.
pub fn resolve(git: &Git) -> Result<Option<Ref>, GitError> {
    let Some(head) = git.head()? else {
        return Ok(None);
    };
    let target = head.oid;

    for tag in git.tags()? {
        if git.peel(&tag.oid)? == target {
            return Ok(Some(tag));
        }
    }

    Ok(None)
}
