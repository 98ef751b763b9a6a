//! Heading anchors for rendered HTML
//!
//! Every `<h1>`..`<h3>` element of the rendered body gets an `id` computed
//! from its own visible text with the same slug rule the outline uses. The
//! outline is not consulted: both sides derive the identifier from the same
//! text, so table of contents links resolve as long as the renderer keeps the
//! heading text. Nested markup and entities are removed before slugging so
//! inline emphasis or `&amp;` in a heading does not change the identifier.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::slug::slug;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(h[1-3])(\s[^>]*)?>(.*?)</(h[1-3])\s*>").expect("valid heading regex")
    })
}

fn id_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\s+id\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid id regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Attach slug identifiers to the level 1-3 headings of an HTML fragment.
///
/// ```
/// use pressmark_core::anchorize;
///
/// let html = anchorize("<h2>My <em>Header</em>!</h2>");
/// assert_eq!(html, "<h2 id=\"my-header\">My <em>Header</em>!</h2>");
/// ```
pub fn anchorize(body: &str) -> String {
    let mut count = 0usize;
    let result = heading_re().replace_all(body, |caps: &Captures| {
        let open = &caps[1];
        let close = &caps[4];
        if !open.eq_ignore_ascii_case(close) {
            return caps[0].to_string();
        }

        count += 1;
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let attrs = id_attr_re().replace_all(attrs, "");
        let inner = &caps[3];
        let id = slug(&heading_text(inner));

        format!("<{open} id=\"{id}\"{attrs}>{inner}</{close}>")
    });

    tracing::debug!(headings = count, "anchored headings");
    result.into_owned()
}

/// Visible text of a heading's inner HTML
pub fn heading_text(inner_html: &str) -> String {
    let stripped = tag_re().replace_all(inner_html, "");
    decode_entities(&stripped).into_owned()
}

/// Decode the character references an HTML renderer emits for text.
///
/// Named references beyond the basic XML set are left as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match tail.find(';').and_then(|end| {
            let name = &tail[1..end];
            decode_reference(name).map(|ch| (ch, end))
        }) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
