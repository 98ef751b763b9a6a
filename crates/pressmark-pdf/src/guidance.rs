//! Manual conversion guidance
//!
//! Shown when every backend failed: the composed HTML is still on disk and
//! any browser can print it.

use std::path::Path;

/// Steps for printing the HTML to PDF by hand
pub fn manual_steps(html: &Path, pdf: &Path) -> Vec<String> {
    vec![
        "Open the HTML file in a web browser (Chrome, Safari, Firefox)".to_string(),
        format!("File to open: {}", html.display()),
        "Print it (Cmd+P on macOS, Ctrl+P elsewhere)".to_string(),
        "Choose \"Save as PDF\" as the destination".to_string(),
        "Enable background graphics so the cover and code blocks keep their colors".to_string(),
        format!("Save to: {}", pdf.display()),
        "Check that the table of contents links jump to their sections".to_string(),
    ]
}

/// Guidance block with a heading and numbered steps
pub fn manual_instructions(html: &Path, pdf: &Path) -> String {
    let rule = "=".repeat(60);
    let mut text = format!("{rule}\nMANUAL PDF CREATION REQUIRED\n{rule}\n");
    text.push_str("\nThe HTML document was generated, but no backend could print it.\n");
    text.push_str("Follow these steps to create the PDF:\n\n");
    for (i, step) in manual_steps(html, pdf).iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, step));
    }
    text.push_str(&rule);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_mention_both_paths() {
        let steps = manual_steps(Path::new("/docs/guide.html"), Path::new("/docs/guide.pdf"));
        assert!(steps.iter().any(|s| s.contains("/docs/guide.html")));
        assert!(steps.iter().any(|s| s.contains("/docs/guide.pdf")));
    }

    #[test]
    fn test_instructions_numbered() {
        let text = manual_instructions(Path::new("a.html"), Path::new("a.pdf"));
        assert!(text.contains("MANUAL PDF CREATION REQUIRED"));
        assert!(text.contains("1. Open the HTML file"));
        assert!(text.contains("6. Save to: a.pdf"));
    }
}
