// src/utils/log.rs

//! Console presentation helpers on top of the `log` facade.
//!
//! Composed posts and link-check reports are printed as framed blocks so they
//! stand out in CI logs.

const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    ::log::info!("{}", border);
    ::log::info!("  {}", title);
    ::log::info!("{}", border);
}

/// Log a separator line
pub fn separator() {
    ::log::info!("{}", "─".repeat(RULE_WIDTH));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    ::log::info!("    {}", message);
}

/// Log a multi-line block, one indented log line per text line.
pub fn block(text: &str) {
    for line in text.lines() {
        sub_item(line);
    }
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in format_summary(title, items).lines() {
        ::log::info!("{}", line);
    }
}

/// Render a summary as text, as it appears in the log.
pub fn format_summary(title: &str, items: &[(&str, String)]) -> String {
    let mut out = format!("[SUMMARY] {}\n", title);
    for (key, value) in items {
        out.push_str(&format!("    {}: {}\n", key, value));
    }
    out
}
