//! Anchor slugs
//!
//! Turns heading text into the identifier used both as a table of contents
//! link target and as the `id` of the rendered heading element.

/// Convert text into an anchor identifier.
///
/// The text is lowercased, every character that is not a letter, digit,
/// whitespace or hyphen is removed, and each run of whitespace/hyphens is
/// collapsed into a single `-`.
///
/// Uniqueness is not enforced and an all-punctuation title yields an empty
/// identifier.
///
/// ```
/// use pressmark_core::slug;
///
/// assert_eq!(slug("My Header!"), "my-header");
/// assert_eq!(slug("Setup -- Step 2"), "setup-step-2");
/// ```
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        } else if ch.is_alphanumeric() {
            if pending_separator {
                out.push('-');
                pending_separator = false;
            }
            out.push(ch);
        }
        // Anything else is dropped without breaking a separator run
    }

    if pending_separator {
        out.push('-');
    }

    out
}
