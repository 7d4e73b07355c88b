//! Page and document assembly.

use crate::model::Page;
use regex::Regex;
use std::sync::LazyLock;

static RE_EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{4,}").unwrap());

/// Joins finalized pages into document text.
///
/// Pages are separated by one empty line. Runs of four or more newlines are
/// reduced to three, and the result is trimmed.
pub fn assemble_pages(pages: &[Page]) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        lines.extend(page.lines.iter().map(String::as_str));
        if i + 1 < pages.len() {
            lines.push("");
        }
    }

    finalize_text(&lines.join("\n"))
}

/// Collapses excess blank lines and trims the document.
pub fn finalize_text(text: &str) -> String {
    RE_EXCESS_NEWLINES
        .replace_all(text, "\n\n\n")
        .trim()
        .to_string()
}
