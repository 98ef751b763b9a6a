//! Markdown to HTML body rendering
//!
//! Markdown grammar is delegated to `pulldown-cmark`; this module only picks
//! the extensions and collects the HTML.

use pulldown_cmark::{html, Options, Parser};

/// Extensions enabled for body rendering
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render markdown source to an HTML fragment (no document shell)
pub fn render_body(source: &str) -> String {
    let parser = Parser::new_ext(source, markdown_options());
    let mut body = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut body, parser);
    body
}

/// Escape text for inclusion in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
