// src/services/extractor.rs

//! Catalog entry extraction from a commit diff.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::ListEntry;
use crate::vcs::ChangeSet;

/// `- [title](url) - description`, anywhere in the line.
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-[ ]\[(.*?)\]\((.*?)\)[ ]-[ ](.*)").expect("entry pattern is a valid regex")
});

/// Finds catalog entries added by a commit.
#[derive(Debug, Clone)]
pub struct EntryExtractor {
    catalog_path: String,
}

impl EntryExtractor {
    pub fn new(catalog_path: impl Into<String>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }

    /// Extract every added entry, in diff order.
    ///
    /// Fails when the commit touches anything but the catalog, or when no
    /// added line has the entry shape.
    pub fn extract(&self, change_set: &ChangeSet) -> Result<Vec<ListEntry>> {
        let diff = match change_set.files.as_slice() {
            [single] => single,
            files => {
                return Err(AppError::diff_shape(format!(
                    "expected a single file diff, commit {} changes {} files",
                    change_set.commit,
                    files.len()
                )));
            }
        };

        if !diff.targets(&self.catalog_path) {
            return Err(AppError::diff_shape(format!(
                "expected a diff of {}, found {} -> {}",
                self.catalog_path,
                diff.old_path.as_deref().unwrap_or("/dev/null"),
                diff.new_path.as_deref().unwrap_or("/dev/null"),
            )));
        }

        let entries = Self::entries_from_patch(&diff.patch);
        if entries.is_empty() {
            return Err(AppError::NoEntryFound);
        }

        log::debug!(
            "Extracted {} entries from {}",
            entries.len(),
            change_set.commit
        );
        Ok(entries)
    }

    /// Parse entries from the added lines of a unified diff.
    pub fn entries_from_patch(patch: &str) -> Vec<ListEntry> {
        patch
            .lines()
            .filter(|line| line.starts_with('+') && !line.starts_with("+++"))
            .flat_map(|line| {
                let entry_line = &line[1..];
                ENTRY_PATTERN.captures_iter(line).filter_map(move |caps| {
                    ListEntry::new(entry_line, &caps[1], &caps[2], &caps[3])
                })
            })
            .collect()
    }
}
