//! Attempt records and run reports

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// How a single backend attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// A valid PDF was produced
    Success,
    /// The backend's dependency is missing; nothing was tried
    Unavailable,
    /// The backend ran and failed, or its output was rejected
    Failed,
}

impl AttemptOutcome {
    /// Lowercase label
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Unavailable => "unavailable",
            AttemptOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend attempt of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderAttempt {
    /// Backend identifier
    pub backend: String,
    /// Outcome
    pub outcome: AttemptOutcome,
    /// Free-text diagnostic
    pub diagnostic: String,
    /// Time spent on the attempt
    pub elapsed_ms: u64,
}

impl RenderAttempt {
    /// Create a record
    pub fn new(
        backend: impl Into<String>,
        outcome: AttemptOutcome,
        diagnostic: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            backend: backend.into(),
            outcome,
            diagnostic: diagnostic.into(),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// A backend produced a valid PDF
    Succeeded {
        backend: String,
        output: PathBuf,
        bytes: u64,
    },
    /// Every configured backend was unavailable or failed
    AllFailed,
    /// The caller stopped the run between attempts
    Cancelled,
}

/// Ordered attempts of a run plus its terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Attempts in the order they were made
    pub attempts: Vec<RenderAttempt>,
    /// Terminal state
    pub state: RunState,
}

impl RenderReport {
    /// Whether a PDF was produced
    pub fn is_success(&self) -> bool {
        matches!(self.state, RunState::Succeeded { .. })
    }

    /// Name of the backend that produced the PDF
    pub fn backend(&self) -> Option<&str> {
        match &self.state {
            RunState::Succeeded { backend, .. } => Some(backend),
            _ => None,
        }
    }

    /// Path of the produced PDF
    pub fn output(&self) -> Option<&Path> {
        match &self.state {
            RunState::Succeeded { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Attempts with the given outcome
    pub fn count(&self, outcome: AttemptOutcome) -> usize {
        self.attempts.iter().filter(|a| a.outcome == outcome).count()
    }

    /// Fixed-width table of the attempts, one line each
    pub fn attempt_table(&self) -> String {
        let width = self
            .attempts
            .iter()
            .map(|a| a.backend.len())
            .max()
            .unwrap_or(0);

        self.attempts
            .iter()
            .map(|a| {
                format!(
                    "  {:<width$}  {:<11}  {}",
                    a.backend,
                    a.outcome.as_str(),
                    a.diagnostic,
                    width = width
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
