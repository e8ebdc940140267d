//! query::snapshot
//!
//! All repository facts in one serializable value.

use std::fmt;

use serde::Serialize;

/// Every fact the facade can answer, in display form.
///
/// Absent facts serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoSnapshot {
    /// Short branch name (`main`)
    pub branch: Option<String>,
    /// Full branch ref (`refs/heads/main`)
    pub branch_ref: Option<String>,
    /// Full HEAD commit id
    pub commit: Option<String>,
    /// Short name of the tag at HEAD
    pub head_tag: Option<String>,
    /// Describe output
    pub describe: Option<String>,
    /// Uncommitted changes to tracked files
    pub dirty: Option<bool>,
    /// Short names of every tag
    pub tags: Vec<String>,
}

impl fmt::Display for RepoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("-")
        }

        writeln!(f, "branch:    {}", show(&self.branch))?;
        writeln!(f, "commit:    {}", show(&self.commit))?;
        writeln!(f, "head tag:  {}", show(&self.head_tag))?;
        writeln!(f, "describe:  {}", show(&self.describe))?;
        match self.dirty {
            Some(dirty) => writeln!(f, "dirty:     {dirty}")?,
            None => writeln!(f, "dirty:     -")?,
        }
        write!(f, "tags:      {}", self.tags.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_facts_render_as_dash() {
        let text = RepoSnapshot::default().to_string();
        assert!(text.contains("branch:    -"));
        assert!(text.contains("dirty:     -"));
        assert!(text.ends_with("tags:      0"));
    }

    #[test]
    fn json_uses_null_for_absent() {
        let snapshot = RepoSnapshot {
            branch: Some("main".into()),
            tags: vec!["v1".into()],
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["branch"], "main");
        assert!(json["commit"].is_null());
        assert_eq!(json["tags"][0], "v1");
    }
}
