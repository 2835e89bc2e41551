// src/services/section.rs

//! Section lookup for catalog entries.

use crate::error::{AppError, Result};

/// Heading marker of the catalog format.
const HEADING_MARKER: char = '#';

/// Find the label of the heading an entry line sits under.
///
/// The entry line must appear verbatim in the catalog. When it appears more
/// than once, the first occurrence with a heading above it wins.
pub fn resolve(catalog_text: &str, entry_line: &str) -> Result<String> {
    let lines: Vec<&str> = catalog_text.lines().collect();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| **line == entry_line)
        .find_map(|(index, _)| {
            lines[..=index]
                .iter()
                .rev()
                .find(|line| line.starts_with(HEADING_MARKER))
                .map(|heading| heading_label(heading))
        })
        .ok_or_else(|| AppError::section_not_found(entry_line))
}

fn heading_label(heading: &str) -> String {
    heading
        .trim_start_matches(HEADING_MARKER)
        .trim()
        .to_string()
}
