//! Catalog entry data structure.

use serde::{Deserialize, Serialize};

/// One list item added to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListEntry {
    /// The literal catalog line, without the diff marker
    pub entry_line: String,

    /// Link text of the entry
    pub title: String,

    /// Link target of the entry
    pub url: String,

    /// Free text after the separator
    pub description: String,
}

impl ListEntry {
    /// Build an entry, rejecting any empty field.
    pub fn new(
        entry_line: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Option<Self> {
        let entry = Self {
            entry_line: entry_line.into(),
            title: title.into(),
            url: url.into(),
            description: description.into(),
        };
        entry.is_complete().then_some(entry)
    }

    fn is_complete(&self) -> bool {
        [&self.entry_line, &self.title, &self.url, &self.description]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}
