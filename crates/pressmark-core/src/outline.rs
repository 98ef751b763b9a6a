//! Outline extraction
//!
//! Scans markdown source line by line and records the level 1-3 ATX headings
//! in document order. The outline drives the table of contents; it is never
//! nested, each entry is a flat `(level, title, anchor)` record.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::slug::slug;

/// Deepest heading level recorded in the outline
pub const MAX_OUTLINE_LEVEL: u8 = 3;

/// Deepest heading level listed in the table of contents
pub const MAX_TOC_LEVEL: u8 = 2;

/// A single heading of the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level (1-3)
    pub level: u8,
    /// Heading text as written in the source, trimmed
    pub title: String,
    /// Slug of the title, used as link target
    pub anchor: String,
}

impl OutlineEntry {
    /// Create an entry, deriving the anchor from the title
    pub fn new(level: u8, title: impl Into<String>) -> Self {
        let title = title.into();
        let anchor = slug(&title);
        Self {
            level,
            title,
            anchor,
        }
    }

    /// Whether this entry is listed in the table of contents
    pub fn is_toc_entry(&self) -> bool {
        self.level <= MAX_TOC_LEVEL
    }
}

/// Extract the heading outline of a markdown document.
///
/// A line is a heading when it starts with one to three `#` markers followed
/// by whitespace and non-empty text. Lines inside fenced code blocks are
/// skipped, and an ATX closing sequence (`## Title ##`) is not part of the
/// title.
///
/// ```
/// use pressmark_core::extract_outline;
///
/// let outline = extract_outline("## My Header!\n\nText");
/// assert_eq!(outline.len(), 1);
/// assert_eq!(outline[0].level, 2);
/// assert_eq!(outline[0].title, "My Header!");
/// assert_eq!(outline[0].anchor, "my-header");
/// ```
pub fn extract_outline(source: &str) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut fence: Option<Fence> = None;

    for line in source.lines() {
        if let Some(open) = fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            continue;
        }

        if let Some(open) = Fence::open(line) {
            fence = Some(open);
            continue;
        }

        if let Some(entry) = scan_heading(line) {
            entries.push(entry);
        }
    }

    tracing::debug!(headings = entries.len(), "extracted outline");
    entries
}

/// Title of the first level 1 heading, if any
pub fn first_title(entries: &[OutlineEntry]) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.level == 1)
        .map(|e| e.title.as_str())
}

/// Classify a single line as an outline heading
fn scan_heading(line: &str) -> Option<OutlineEntry> {
    static HEADING_RE: OnceLock<Regex> = OnceLock::new();
    static CLOSING_RE: OnceLock<Regex> = OnceLock::new();

    let heading_re = HEADING_RE.get_or_init(|| {
        // 1-3 markers, whitespace, then at least one visible character
        Regex::new(r"^(#{1,3})\s+(\S.*)$").expect("valid heading regex")
    });
    let closing_re =
        CLOSING_RE.get_or_init(|| Regex::new(r"\s+#+\s*$").expect("valid closing regex"));

    let caps = heading_re.captures(line)?;
    let level = caps[1].len() as u8;
    let mut title = caps[2].trim();

    // A title made only of '#' is an empty heading with a closing sequence
    if title.chars().all(|c| c == '#') {
        return None;
    }
    if let Some(m) = closing_re.find(title) {
        title = title[..m.start()].trim_end();
    }

    Some(OutlineEntry::new(level, title))
}

/// An open fenced code block
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Detect an opening fence (``` or ~~~, indented at most three spaces)
    fn open(line: &str) -> Option<Self> {
        let (marker, len, _) = fence_run(line)?;
        Some(Self { marker, len })
    }

    /// A closing fence uses the same marker, is at least as long and carries
    /// no info string
    fn is_closed_by(&self, line: &str) -> bool {
        match fence_run(line) {
            Some((marker, len, rest)) => {
                marker == self.marker && len >= self.len && rest.trim().is_empty()
            }
            None => false,
        }
    }
}

fn fence_run(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let body = &line[indent..];
    let marker = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = body.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    Some((marker, len, &body[len..]))
}
