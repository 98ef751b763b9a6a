//! pressmark CLI - Command-line interface library
//!
//! This library provides the CLI functionality for pressmark, including:
//! - Convert: Markdown to PDF through the backend fallback chain
//! - Html: Compose the printable HTML only
//! - Outline: Print the heading outline
//! - Backends: Report which render backends can run on this host
//!
//! # Library Usage
//!
//! ```ignore
//! use pressmark_cli::{convert_command, ConvertArgs};
//!
//! let args = ConvertArgs {
//!     input: "guide.md".into(),
//!     ..ConvertArgs::default()
//! };
//! convert_command(&args)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert with the configured backend chain
//! pressmark convert guide.md -o guide.pdf
//!
//! # Force a specific chain and keep the HTML
//! pressmark convert guide.md --backend chrome --backend typst --keep-html
//!
//! # Inspect the outline as JSON
//! pressmark outline guide.md --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{backends_command, convert_command, html_command, init_logging, outline_command};
pub use app::{run_cli, ConvertArgs, DocumentArgs, OutputFormat};
