//! pressmark-pdf - PDF rendering with a backend fallback chain
//!
//! This crate turns the composed document from `pressmark-core` into a PDF by
//! trying render backends in priority order until one produces a valid file.
//!
//! # Architecture
//!
//! 1. **Backends** - Implement [`PdfBackend`]; each wraps one converter
//!    (headless Chrome, Safari automation, cupsfilter, pandoc,
//!    enscript + ps2pdf, in-process Typst)
//! 2. **Engine** - [`RenderEngine`] walks the backends, validates output and
//!    records every attempt in a [`RenderReport`]
//! 3. **Pipeline** - [`convert`] composes, stages the HTML and renders
//!
//! # Example
//!
//! ```ignore
//! use pressmark_core::{Cover, DEFAULT_STYLESHEET};
//! use pressmark_pdf::{convert, ConvertRequest, RenderEngine, RenderOptions};
//!
//! let request = ConvertRequest {
//!     source: "# Guide\n\nHello.\n",
//!     cover: Cover::new("Guide"),
//!     stylesheet: DEFAULT_STYLESHEET,
//!     output: "guide.pdf".into(),
//!     keep_html: false,
//!     base_dir: Some(".".into()),
//! };
//! let conversion = convert(&request, &RenderEngine::new(), &RenderOptions::default())?;
//! println!("{}", conversion.report.attempt_table());
//! ```

pub mod attempt;
pub mod backend;
pub mod backends;
pub mod engine;
pub mod guidance;
pub mod inspect;
pub mod pipeline;
pub mod process;
pub mod staging;
pub mod transpiler;
pub mod wait;

#[cfg(feature = "typst")]
mod compiler;

pub use attempt::{AttemptOutcome, RenderAttempt, RenderReport, RunState};
pub use backend::{BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult};
pub use backends::{backend_by_name, BackendConfig, BACKEND_NAMES};
pub use engine::{BackendStatus, RenderEngine};
pub use guidance::{manual_instructions, manual_steps};
pub use inspect::{format_size, PdfInfo};
pub use pipeline::{convert, Conversion, ConvertRequest};
pub use staging::StagedHtml;
pub use wait::{await_load, WaitPolicy, Waited};

#[cfg(feature = "typst")]
pub use compiler::Compiler;
pub use transpiler::Transpiler;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
