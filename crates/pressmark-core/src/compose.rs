//! Document composition
//!
//! Assembles the cover page, the table of contents and the anchored body into
//! a single HTML document that render backends consume.

use std::fmt::Write;

use chrono::{Local, NaiveDate};

use crate::anchor::anchorize;
use crate::markdown::{escape_html, render_body};
use crate::outline::{extract_outline, OutlineEntry};

/// Stylesheet used when the caller does not supply one
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/default.css");

/// Cover page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    /// Document title
    pub title: String,
    /// Optional line below the title
    pub subtitle: Option<String>,
    /// Date printed as the generation timestamp
    pub generated: NaiveDate,
}

impl Cover {
    /// Cover dated today
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            generated: Local::now().date_naive(),
        }
    }

    /// Set the subtitle
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the generation date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.generated = date;
        self
    }

    /// Generation date as printed on the cover, e.g. "March 04, 2025"
    pub fn date_label(&self) -> String {
        self.generated.format("%B %d, %Y").to_string()
    }
}

/// Render the cover page block
pub fn cover_html(cover: &Cover) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"cover-page\">\n");
    let _ = writeln!(html, "    <h1>{}</h1>", escape_html(&cover.title));
    if let Some(ref subtitle) = cover.subtitle {
        let _ = writeln!(html, "    <div class=\"subtitle\">{}</div>", escape_html(subtitle));
    }
    let _ = writeln!(
        html,
        "    <div class=\"date\">Generated on {}</div>",
        cover.date_label()
    );
    html.push_str("</div>\n");
    html
}

/// Render the table of contents block.
///
/// Only level 1 and 2 entries are listed; each is indented by four
/// non-breaking spaces per level below the top.
pub fn toc_html(entries: &[OutlineEntry]) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"toc\">\n");
    html.push_str("    <h1>Table of Contents</h1>\n");
    html.push_str("    <ul>\n");

    for entry in entries.iter().filter(|e| e.is_toc_entry()) {
        let indent = "&nbsp;".repeat(4 * usize::from(entry.level.saturating_sub(1)));
        let _ = writeln!(
            html,
            "        <li>{}<a href=\"#{}\">{}</a></li>",
            indent,
            escape_html(&entry.anchor),
            escape_html(&entry.title)
        );
    }

    html.push_str("    </ul>\n");
    html.push_str("</div>\n");
    html
}

/// The single document handed to render backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    /// Document title (used for `<title>`)
    pub title: String,
    /// Complete HTML document
    pub html: String,
}

impl ComposedDocument {
    /// Size of the HTML in bytes
    pub fn len(&self) -> usize {
        self.html.len()
    }

    /// Whether the HTML is empty
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Wraps cover, table of contents and body in one HTML shell
#[derive(Debug, Clone)]
pub struct Composer {
    title: String,
    stylesheet: String,
}

impl Composer {
    /// Create a composer for a titled document using the given CSS
    pub fn new(title: impl Into<String>, stylesheet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stylesheet: stylesheet.into(),
        }
    }

    /// Create a composer with the built-in stylesheet
    pub fn with_default_style(title: impl Into<String>) -> Self {
        Self::new(title, DEFAULT_STYLESHEET)
    }

    /// Concatenate the three blocks in fixed order
    pub fn compose(&self, cover: &str, toc: &str, body: &str) -> ComposedDocument {
        let title = escape_html(&self.title);
        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{style}
    </style>
</head>
<body>
{cover}{toc}<div class="content">
{body}</div>
</body>
</html>
"#,
            title = title,
            style = self.stylesheet,
            cover = cover,
            toc = toc,
            body = body,
        );

        ComposedDocument {
            title: self.title.clone(),
            html,
        }
    }
}

/// Result of running the whole assembly pipeline
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// Outline extracted from the source
    pub outline: Vec<OutlineEntry>,
    /// Composed HTML document
    pub document: ComposedDocument,
}

/// Extract, render, anchor and compose a markdown document
pub fn build_document(source: &str, cover: &Cover, stylesheet: &str) -> BuiltDocument {
    let outline = extract_outline(source);
    let body = anchorize(&render_body(source));
    let composer = Composer::new(cover.title.clone(), stylesheet);
    let document = composer.compose(&cover_html(cover), &toc_html(&outline), &body);

    tracing::info!(
        headings = outline.len(),
        bytes = document.len(),
        "composed document"
    );

    BuiltDocument { outline, document }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_cover_html() {
        let cover = Cover::new("Brrow")
            .with_subtitle("Complete System Documentation")
            .with_date(date());
        let html = cover_html(&cover);
        assert!(html.contains("<h1>Brrow</h1>"));
        assert!(html.contains("<div class=\"subtitle\">Complete System Documentation</div>"));
        assert!(html.contains("Generated on March 04, 2025"));
    }

    #[test]
    fn test_cover_without_subtitle() {
        let html = cover_html(&Cover::new("T").with_date(date()));
        assert!(!html.contains("subtitle"));
    }

    #[test]
    fn test_toc_excludes_level_three() {
        let entries = vec![
            OutlineEntry::new(1, "Top"),
            OutlineEntry::new(2, "Middle"),
            OutlineEntry::new(3, "Deep"),
        ];
        let html = toc_html(&entries);
        assert!(html.contains("<a href=\"#top\">Top</a>"));
        assert!(html.contains("<a href=\"#middle\">Middle</a>"));
        assert!(!html.contains("Deep"));
        assert!(!html.contains("#deep"));
    }

    #[test]
    fn test_toc_indentation() {
        let entries = vec![OutlineEntry::new(1, "A"), OutlineEntry::new(2, "B")];
        let html = toc_html(&entries);
        assert!(html.contains("<li><a href=\"#a\">A</a></li>"));
        assert!(html.contains(&format!("<li>{}<a href=\"#b\">B</a></li>", "&nbsp;".repeat(4))));
    }

    #[test]
    fn test_toc_escapes_titles() {
        let html = toc_html(&[OutlineEntry::new(1, "<script> & co")]);
        assert!(html.contains("&lt;script&gt; &amp; co"));
        assert!(html.contains("href=\"#script-co\""));
    }

    #[test]
    fn test_toc_duplicate_anchors_kept() {
        let entries = vec![OutlineEntry::new(2, "Usage"), OutlineEntry::new(2, "Usage")];
        let html = toc_html(&entries);
        assert_eq!(html.matches("href=\"#usage\"").count(), 2);
    }

    #[test]
    fn test_compose_order() {
        let composer = Composer::new("Doc", "body { color: red; }");
        let doc = composer.compose("<div>COVER</div>", "<div>TOC</div>", "<p>BODY</p>");
        let cover = doc.html.find("COVER").unwrap();
        let toc = doc.html.find("TOC").unwrap();
        let body = doc.html.find("BODY").unwrap();
        assert!(cover < toc && toc < body);
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("<title>Doc</title>"));
        assert!(doc.html.contains("body { color: red; }"));
        assert!(doc.html.contains("<div class=\"content\">\n<p>BODY</p>"));
        assert_eq!(doc.title, "Doc");
    }

    #[test]
    fn test_build_document_links_resolve() {
        let source = "# Guide\n\n## Install & Run\n\ntext\n\n### Details\n";
        let cover = Cover::new("Guide").with_date(date());
        let built = build_document(source, &cover, DEFAULT_STYLESHEET);

        assert_eq!(built.outline.len(), 3);
        let html = &built.document.html;
        assert!(html.contains("href=\"#install-run\""));
        assert!(html.contains("<h2 id=\"install-run\">"));
        assert!(html.contains("<h3 id=\"details\">"));
        assert!(!html.contains("href=\"#details\""));
    }
}
