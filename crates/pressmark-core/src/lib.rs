//! pressmark-core - Markdown to printable HTML
//!
//! Builds the single HTML document that pressmark's render backends turn
//! into a PDF: a cover page, a table of contents with in-document links, and
//! the rendered body with anchored headings.
//!
//! # Example
//!
//! ```
//! use pressmark_core::{build_document, Cover, DEFAULT_STYLESHEET};
//!
//! let source = "# Guide\n\n## Install\n\nRun the installer.\n";
//! let built = build_document(source, &Cover::new("Guide"), DEFAULT_STYLESHEET);
//!
//! assert_eq!(built.outline.len(), 2);
//! assert!(built.document.html.contains("<a href=\"#install\">Install</a>"));
//! assert!(built.document.html.contains("<h2 id=\"install\">Install</h2>"));
//! ```

pub mod anchor;
pub mod compose;
pub mod config;
pub mod error;
pub mod markdown;
pub mod outline;
pub mod slug;

// Re-export main types and functions
pub use anchor::anchorize;
pub use compose::{
    build_document, cover_html, toc_html, BuiltDocument, ComposedDocument, Composer, Cover,
    DEFAULT_STYLESHEET,
};
pub use config::{DocumentSettings, RenderSettings, Settings, CONFIG_FILE_NAME, DEFAULT_BACKENDS};
pub use error::{CoreError, Result};
pub use markdown::render_body;
pub use outline::{extract_outline, first_title, OutlineEntry};
pub use slug::slug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
