//! Version control access.
//!
//! The pipeline only needs three things from the repository: the message of
//! the triggering commit, the per-file diffs of that commit against its first
//! parent, and the catalog text as of that commit.

pub mod git;

use async_trait::async_trait;

use crate::error::Result;

pub use git::GitCli;

/// Diff of a single file between a commit and its first parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path before the commit (`None` for newly added files)
    pub old_path: Option<String>,
    /// Path after the commit (`None` for deleted files)
    pub new_path: Option<String>,
    /// Unified diff text
    pub patch: String,
}

impl FileDiff {
    /// Whether this diff modifies (or creates) exactly the given path.
    pub fn targets(&self, path: &str) -> bool {
        self.new_path.as_deref() == Some(path)
            && self.old_path.as_deref().is_none_or(|old| old == path)
    }
}

/// Everything a commit changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub commit: String,
    pub message: String,
    pub files: Vec<FileDiff>,
}

impl ChangeSet {
    /// Whether the commit message contains the trigger phrase.
    pub fn is_triggered_by(&self, trigger: &str) -> bool {
        self.message.contains(trigger)
    }
}

/// Source of commits and file contents.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Load the message and per-file diffs of a commit.
    async fn change_set(&self, commit: &str) -> Result<ChangeSet>;

    /// Load the text of a file as of a commit.
    async fn file_at(&self, commit: &str, path: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old: Option<&str>, new: Option<&str>) -> FileDiff {
        FileDiff {
            old_path: old.map(String::from),
            new_path: new.map(String::from),
            patch: String::new(),
        }
    }

    #[test]
    fn test_targets_modified_file() {
        assert!(diff(Some("README.md"), Some("README.md")).targets("README.md"));
        assert!(diff(None, Some("README.md")).targets("README.md"));
    }

    #[test]
    fn test_targets_rejects_other_paths() {
        assert!(!diff(Some("docs.md"), Some("docs.md")).targets("README.md"));
        assert!(!diff(Some("OLD.md"), Some("README.md")).targets("README.md"));
        assert!(!diff(Some("README.md"), None).targets("README.md"));
    }

    #[test]
    fn test_trigger_phrase() {
        let change_set = ChangeSet {
            commit: "abc123".into(),
            message: "Add MB1013 library\n\n[tweet]".into(),
            files: Vec::new(),
        };
        assert!(change_set.is_triggered_by("[tweet]"));
        assert!(!change_set.is_triggered_by("[skeet]"));
    }
}
