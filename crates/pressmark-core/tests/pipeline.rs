//! Integration tests for pressmark-core
//!
//! These tests verify the composition pipeline end to end:
//! markdown -> outline + anchored body -> composed HTML

use std::fs;

use chrono::NaiveDate;
use pressmark_core::{
    anchorize, build_document, extract_outline, render_body, slug, toc_html, Cover, Settings,
    DEFAULT_STYLESHEET,
};
use tempfile::TempDir;

const GUIDE: &str = "# Brrow

Intro paragraph.

## Getting Started!

Install the app.

### Deep Detail

Only in the body.

## FAQ & Support

```bash
# not a heading
echo hi
```

## Getting Started!
";

fn cover() -> Cover {
    Cover::new("Brrow")
        .with_subtitle("Complete System Documentation")
        .with_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
}

#[test]
fn test_slug_is_idempotent() {
    for input in ["My Header!", "  Spaces  and--dashes ", "Ünïcödé Títle", "a_b c", "", "###"] {
        let once = slug(input);
        assert_eq!(slug(&once), once, "slug not idempotent for {input:?}");
    }
}

#[test]
fn test_outline_of_guide() {
    let outline = extract_outline(GUIDE);
    let summary: Vec<(u8, &str, &str)> = outline
        .iter()
        .map(|e| (e.level, e.title.as_str(), e.anchor.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (1, "Brrow", "brrow"),
            (2, "Getting Started!", "getting-started"),
            (3, "Deep Detail", "deep-detail"),
            (2, "FAQ & Support", "faq-support"),
            (2, "Getting Started!", "getting-started"),
        ]
    );
}

#[test]
fn test_plain_text_has_no_outline() {
    assert!(extract_outline("just text\nand more text\n").is_empty());
}

#[test]
fn test_toc_excludes_level_three() {
    let toc = toc_html(&extract_outline(GUIDE));
    assert!(!toc.contains("Deep Detail"));
    assert!(toc.contains("href=\"#faq-support\""));
    assert!(toc.contains("FAQ &amp; Support"));
}

#[test]
fn test_every_toc_link_has_a_target() {
    let built = build_document(GUIDE, &cover(), DEFAULT_STYLESHEET);
    for entry in built.outline.iter().filter(|e| e.is_toc_entry()) {
        let target = format!("id=\"{}\"", entry.anchor);
        assert!(
            built.document.html.contains(&target),
            "missing target for {}",
            entry.anchor
        );
    }
}

#[test]
fn test_duplicate_titles_share_anchor() {
    let body = anchorize(&render_body(GUIDE));
    assert_eq!(body.matches("id=\"getting-started\"").count(), 2);
}

#[test]
fn test_document_order() {
    let html = build_document(GUIDE, &cover(), DEFAULT_STYLESHEET).document.html;
    let cover_at = html.find("class=\"cover-page\"").unwrap();
    let toc_at = html.find("class=\"toc\"").unwrap();
    let body_at = html.find("class=\"content\"").unwrap();
    assert!(cover_at < toc_at && toc_at < body_at);
    assert!(html.contains("Generated on January 15, 2025"));
    assert!(html.contains("Complete System Documentation"));
}

#[test]
fn test_settings_from_file_beside_input() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pressmark.toml"),
        "[document]\ntitle = \"Brrow\"\nstylesheet = \"print.css\"\n\n[render]\nbackends = [\"typst\"]\n",
    )
    .unwrap();

    let settings = Settings::discover(dir.path()).unwrap();

    assert_eq!(settings.document.title.as_deref(), Some("Brrow"));
    assert_eq!(
        settings.document.stylesheet,
        Some(dir.path().join("print.css"))
    );
    assert_eq!(settings.render.backends, vec!["typst".to_string()]);
    assert_eq!(settings.render.min_bytes, 1000);
}

#[test]
fn test_heading_with_link_keeps_raw_title_anchor() {
    // The outline slugs the raw markdown title while the body slugs the
    // rendered text, so a link inside a heading yields two different ids
    let source = "## See [the docs](https://example.com/guide)\n";
    let outline = extract_outline(source);
    let body = anchorize(&render_body(source));

    assert_eq!(outline[0].anchor, "see-the-docshttpsexamplecomguide");
    assert!(body.contains("<h2 id=\"see-the-docs\">"));
    assert!(!body.contains(&format!("id=\"{}\"", outline[0].anchor)));
}
