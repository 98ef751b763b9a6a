//! Render strategy selection with fallback chain
//!
//! This module provides the main entry point for PDF rendering,
//! orchestrating multiple backends with priority-based fallback.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RenderEngine                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Default priority order:                                     │
//! │  1. chrome      - headless Chrome/Chromium print-to-pdf      │
//! │  2. safari      - macOS automation (Export as PDF)           │
//! │  3. cupsfilter  - CUPS HTML filter                           │
//! │  4. pandoc      - pandoc with a PDF engine                   │
//! │  5. enscript    - enscript + ps2pdf                          │
//! │  6. typst       - in-process typesetting from markdown       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each run walks the list until one backend leaves a PDF larger than the
//! size floor at the output path. Unavailable backends are skipped without
//! spending any time budget, partial output is removed before the next
//! backend starts, and the run always ends in a [`RenderReport`] rather than
//! an error.

use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use crate::attempt::{AttemptOutcome, RenderAttempt, RenderReport, RunState};
use crate::backend::{PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult};
use crate::backends::{backend_by_name, BackendConfig};

/// PDF render engine with fallback chain
///
/// # Example
///
/// ```ignore
/// use pressmark_pdf::{RenderEngine, RenderJob, RenderOptions};
///
/// let engine = RenderEngine::new();
/// let report = engine.render(&job, &RenderOptions::default());
/// if !report.is_success() {
///     println!("{}", report.attempt_table());
/// }
/// ```
pub struct RenderEngine {
    /// Registered backends in priority order
    backends: Vec<Box<dyn PdfBackend>>,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine {
    /// Create an engine with the default backend order and configuration
    pub fn new() -> Self {
        let config = BackendConfig::default();
        let mut engine = Self::empty();
        for name in pressmark_core::DEFAULT_BACKENDS {
            match backend_by_name(name, &config) {
                Ok(backend) => engine.add_backend(backend),
                Err(e) => tracing::debug!(backend = name, "skipping backend: {}", e),
            }
        }
        engine
    }

    /// Create an engine from backend names in priority order
    ///
    /// Fails on the first name that is not a known backend.
    pub fn from_names<S: AsRef<str>>(names: &[S], config: &BackendConfig) -> RenderResult<Self> {
        let mut engine = Self::empty();
        for name in names {
            engine.add_backend(backend_by_name(name.as_ref(), config)?);
        }
        Ok(engine)
    }

    /// Create an engine with no backends (for testing)
    pub fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Add a backend at the lowest priority
    pub fn add_backend(&mut self, backend: Box<dyn PdfBackend>) {
        tracing::debug!(backend = backend.name(), "added backend");
        self.backends.push(backend);
    }

    /// Insert a backend at a specific priority position
    ///
    /// Lower indices = higher priority.
    pub fn insert_backend(&mut self, index: usize, backend: Box<dyn PdfBackend>) {
        tracing::debug!(backend = backend.name(), index, "inserted backend");
        self.backends.insert(index.min(self.backends.len()), backend);
    }

    /// Names of the registered backends in priority order
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Availability of every backend, without rendering
    pub fn probe(&self) -> Vec<BackendStatus> {
        self.backends
            .iter()
            .map(|b| {
                let available = b.is_available();
                BackendStatus {
                    name: b.name(),
                    available,
                    hint: if available {
                        None
                    } else {
                        Some(b.availability_hint())
                    },
                }
            })
            .collect()
    }

    /// Render the job, trying backends in priority order.
    ///
    /// Never fails: backend errors and panics are recorded as attempts and
    /// the caller inspects [`RenderReport::state`].
    pub fn render(&self, job: &RenderJob, options: &RenderOptions) -> RenderReport {
        let output = job.output();
        let mut attempts = Vec::with_capacity(self.backends.len());

        if let Err(e) = remove_artifact(output) {
            tracing::warn!(output = %output.display(), "could not remove stale output: {}", e);
        }

        for backend in &self.backends {
            if options.is_cancelled() {
                tracing::info!(next = backend.name(), "render cancelled");
                return RenderReport {
                    attempts,
                    state: RunState::Cancelled,
                };
            }

            let name = backend.name();
            let started = Instant::now();

            if !backend.is_available() {
                let hint = backend.availability_hint();
                tracing::debug!(backend = name, "unavailable: {}", hint);
                attempts.push(RenderAttempt::new(
                    name,
                    AttemptOutcome::Unavailable,
                    hint,
                    started.elapsed(),
                ));
                continue;
            }

            tracing::info!(backend = name, output = %output.display(), "trying backend");
            let result = panic::catch_unwind(AssertUnwindSafe(|| backend.attempt(job, options)))
                .unwrap_or_else(|payload| Err(RenderError::Panic(panic_message(payload))));

            let attempt = match result {
                Ok(produced) => match validate_artifact(output, options.min_bytes) {
                    Ok(bytes) => {
                        let diagnostic = if produced.diagnostics.is_empty() {
                            format!("wrote {} bytes", bytes)
                        } else {
                            format!("wrote {} bytes; {}", bytes, produced.diagnostics.join("; "))
                        };
                        tracing::info!(backend = name, bytes, "backend succeeded");
                        attempts.push(RenderAttempt::new(
                            name,
                            AttemptOutcome::Success,
                            diagnostic,
                            started.elapsed(),
                        ));
                        return RenderReport {
                            attempts,
                            state: RunState::Succeeded {
                                backend: name.to_string(),
                                output: output.to_path_buf(),
                                bytes,
                            },
                        };
                    }
                    Err(reason) => RenderAttempt::new(
                        name,
                        AttemptOutcome::Failed,
                        reason,
                        started.elapsed(),
                    ),
                },
                Err(RenderError::Unavailable(reason)) => RenderAttempt::new(
                    name,
                    AttemptOutcome::Unavailable,
                    reason,
                    started.elapsed(),
                ),
                Err(e) => RenderAttempt::new(
                    name,
                    AttemptOutcome::Failed,
                    e.to_string(),
                    started.elapsed(),
                ),
            };

            tracing::warn!(
                backend = name,
                outcome = %attempt.outcome,
                "backend did not produce a PDF: {}",
                attempt.diagnostic
            );
            if let Err(e) = remove_artifact(output) {
                tracing::warn!(output = %output.display(), "could not remove partial output: {}", e);
            }
            attempts.push(attempt);
        }

        tracing::warn!(attempts = attempts.len(), "all backends exhausted");
        RenderReport {
            attempts,
            state: RunState::AllFailed,
        }
    }
}

/// Availability of one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    /// Backend identifier
    pub name: &'static str,
    /// Whether its dependency is present
    pub available: bool,
    /// Why not, when unavailable
    pub hint: Option<String>,
}

/// Check that the output exists and exceeds the size floor
fn validate_artifact(output: &Path, min_bytes: u64) -> Result<u64, String> {
    match fs::metadata(output) {
        Ok(meta) if !meta.is_file() => Err(format!("{} is not a file", output.display())),
        Ok(meta) if meta.len() <= min_bytes => Err(format!(
            "output too small: {} bytes (must exceed {})",
            meta.len(),
            min_bytes
        )),
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err("no output file produced".to_string()),
        Err(e) => Err(format!("cannot inspect output: {}", e)),
    }
}

/// Remove a file if it exists
fn remove_artifact(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed artifact");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
