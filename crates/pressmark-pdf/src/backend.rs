//! PDF backend trait and error types
//!
//! This module defines the core abstraction for render backends, enabling a
//! pluggable, fallback-based rendering architecture.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pressmark_core::{ComposedDocument, Cover, OutlineEntry, RenderSettings};

use crate::wait::WaitPolicy;

/// Errors that can occur during a backend attempt
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The backend's engine or tool is not present on this host
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but did not produce a usable PDF
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    /// An external process exited unsuccessfully
    #[error("Process failed: {0}")]
    Process(String),

    /// An external process exceeded its time budget and was killed
    #[error("{program} timed out after {secs:.1}s")]
    Timeout { program: String, secs: f64 },

    /// The backend panicked (caught via catch_unwind)
    #[error("Backend panicked: {0}")]
    Panic(String),

    /// The requested output path cannot be used
    #[error("Invalid output path: {0}")]
    InvalidOutput(String),

        /// No backend with this name exists
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backend operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Options shared by every backend of a run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// A produced PDF must be larger than this many bytes
    pub min_bytes: u64,
    /// Interval between readiness polls
    pub poll_interval: Duration,
    /// Budget for asynchronous document loading
    pub load_timeout: Duration,
    /// Budget for an external converter process
    pub process_timeout: Duration,
    /// Set by the caller to stop before the next backend
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl RenderOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from the `[render]` configuration section
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            min_bytes: settings.min_bytes,
            poll_interval: settings.poll_interval(),
            load_timeout: settings.load_timeout(),
            process_timeout: settings.process_timeout(),
            cancel: None,
        }
    }

    /// Set the size floor
    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the load timeout
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set the process timeout
    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self
    }

    /// Attach a cancellation flag checked between backends
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the caller asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Wait policy for document load signals
    pub fn load_policy(&self) -> WaitPolicy {
        WaitPolicy::new(self.poll_interval, self.load_timeout)
    }

    /// Wait policy for external processes
    pub fn process_policy(&self) -> WaitPolicy {
        WaitPolicy::new(self.poll_interval, self.process_timeout)
    }
}

/// Everything a backend may need to produce the PDF
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Composed HTML document
    pub document: ComposedDocument,
    /// The composed document written to disk, for file-based converters
    pub html_path: PathBuf,
    /// Original markdown, for backends that typeset from source
    pub source: String,
    /// Outline of the source
    pub outline: Vec<OutlineEntry>,
    /// Cover page content
    pub cover: Cover,
    /// Where the PDF must be written
    pub output: PathBuf,
}

impl RenderJob {
    /// Job for an already-staged HTML document
    pub fn new(
        document: ComposedDocument,
        html_path: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let cover = Cover::new(document.title.clone());
        Self {
            document,
            html_path: html_path.into(),
            source: String::new(),
            outline: Vec::new(),
            cover,
            output: output.into(),
        }
    }

    /// Attach the markdown source, its outline and the cover
    pub fn with_source(
        mut self,
        source: impl Into<String>,
        outline: Vec<OutlineEntry>,
        cover: Cover,
    ) -> Self {
        self.source = source.into();
        self.outline = outline;
        self.cover = cover;
        self
    }

    /// Target PDF path
    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// What a backend reports after writing the output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOutput {
    /// Notes worth surfacing, e.g. a load timeout that was tolerated
    pub diagnostics: Vec<String>,
}

impl BackendOutput {
    /// Output without notes
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note
    pub fn with_diagnostic(mut self, note: impl Into<String>) -> Self {
        self.diagnostics.push(note.into());
        self
    }
}

/// Trait for PDF render backends
///
/// Implementors turn a [`RenderJob`] into a PDF at `job.output`. The engine
/// orchestrates multiple backends with fallback logic, validates the file
/// and removes partial output, so backends only report what happened.
///
/// # Thread Safety
///
/// Backends must be `Send + Sync` so independent runs can share an engine.
pub trait PdfBackend: Send + Sync {
    /// Short identifier used in configuration and attempt records
    fn name(&self) -> &'static str;

    /// Check if the backend's dependency is present on this host
    ///
    /// Must be cheap and must not start rendering work.
    fn is_available(&self) -> bool {
        true
    }

    /// Why the backend is unavailable, shown in attempt records
    fn availability_hint(&self) -> String {
        format!("{} is not available on this host", self.name())
    }

    /// Render the job to `job.output`
    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let opts = RenderOptions::new()
            .with_min_bytes(10)
            .with_poll_interval(Duration::from_millis(5))
            .with_load_timeout(Duration::from_secs(2))
            .with_process_timeout(Duration::from_secs(3));

        assert_eq!(opts.min_bytes, 10);
        assert_eq!(opts.load_policy().interval, Duration::from_millis(5));
        assert_eq!(opts.load_policy().timeout, Duration::from_secs(2));
        assert_eq!(opts.process_policy().timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_default_options_follow_settings() {
        let opts = RenderOptions::default();
        assert_eq!(opts.min_bytes, 1000);
        assert_eq!(opts.poll_interval, Duration::from_millis(100));
        assert_eq!(opts.load_timeout, Duration::from_secs(30));
        assert!(!opts.is_cancelled());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let opts = RenderOptions::new().with_cancel_flag(flag.clone());
        assert!(!opts.is_cancelled());
        flag.store(true, Ordering::SeqCst);
        assert!(opts.is_cancelled());
    }

    #[test]
    fn test_job_builder() {
        let doc = ComposedDocument {
            title: "Doc".to_string(),
            html: "<html></html>".to_string(),
        };
        let job = RenderJob::new(doc, "/tmp/doc.html", "/tmp/doc.pdf").with_source(
            "# Doc",
            vec![OutlineEntry::new(1, "Doc")],
            Cover::new("Custom"),
        );
        assert_eq!(job.output(), Path::new("/tmp/doc.pdf"));
        assert_eq!(job.source, "# Doc");
        assert_eq!(job.cover.title, "Custom");
        assert_eq!(job.outline.len(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::Timeout {
            program: "chrome".to_string(),
            secs: 60.0,
        };
        assert_eq!(err.to_string(), "chrome timed out after 60.0s");
    }
}
