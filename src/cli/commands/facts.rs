//! Query commands - print one repository fact each
//!
//! Absent facts print nothing. The exit status stays zero either way, so
//! scripts can use `$(gitfacts branch)` without special-casing detached
//! HEADs or missing repositories.

use anyhow::Result;

use crate::query::GitFacts;

fn print_if_some(value: Option<impl std::fmt::Display>) {
    if let Some(value) = value {
        println!("{}", value);
    }
}

/// Print the short branch name.
pub fn branch(facts: &GitFacts) -> Result<()> {
    print_if_some(facts.branch_name().get().as_deref());
    Ok(())
}

/// Print the full branch ref.
pub fn branch_ref(facts: &GitFacts) -> Result<()> {
    print_if_some(facts.branch().get().as_ref().map(|b| &b.name));
    Ok(())
}

/// Print the HEAD commit, abbreviated to `abbrev` characters if given.
pub fn commit(facts: &GitFacts, abbrev: Option<u32>) -> Result<()> {
    let commit = facts.commit();
    print_if_some(commit.get().as_ref().map(|oid| match abbrev {
        Some(len) => oid.short(len as usize),
        None => oid.to_string(),
    }));
    Ok(())
}

/// Print every tag.
pub fn tags(facts: &GitFacts, long: bool) -> Result<()> {
    for tag in facts.tags().get() {
        if long {
            println!("{}", tag);
        } else {
            println!("{}", tag.short_name());
        }
    }
    Ok(())
}

/// Print the tag at HEAD.
pub fn head_tag(facts: &GitFacts) -> Result<()> {
    print_if_some(facts.head_tag().get().as_ref().map(|t| t.short_name()));
    Ok(())
}

/// Print the describe string.
pub fn describe(facts: &GitFacts) -> Result<()> {
    print_if_some(facts.describe().get().as_deref());
    Ok(())
}

/// Print all facts.
pub fn show(facts: &GitFacts, json: bool) -> Result<()> {
    let snapshot = facts.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.get())?);
    } else {
        println!("{}", snapshot.get());
    }
    Ok(())
}
