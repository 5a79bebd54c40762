//! Corpus indexer: splits a flat document into titled sections.
//!
//! A line of the form `# Title` opens a section. Everything up to the next
//! such line (blank lines and `##` sub-headings included) is that section's
//! body. Text before the first marker is discarded.

use serde::{Deserialize, Serialize};

/// A titled, contiguous block of the documentation corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub title: String,
    pub body: String,
}

/// If `line` is a top-level section marker, return its trimmed title.
fn section_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("# ")?;
    let title = rest.trim();
    if title.is_empty() { None } else { Some(title) }
}

/// Split `text` into sections in document order.
///
/// Body lines are kept verbatim and re-joined with `\n`.
pub fn parse_sections(text: &str) -> Vec<DocumentSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(title) = section_title(line) {
            if let Some((title, lines)) = current.take() {
                sections.push(DocumentSection {
                    title,
                    body: lines.join("\n"),
                });
            }
            current = Some((title.to_string(), Vec::new()));
        } else if let Some((_, ref mut lines)) = current {
            lines.push(line);
        }
    }

    if let Some((title, lines)) = current {
        sections.push(DocumentSection {
            title,
            body: lines.join("\n"),
        });
    }
    sections
}
