//! Bounded polling
//!
//! Backends that depend on something finishing asynchronously (a browser
//! loading a page, a converter process exiting, an exported file appearing)
//! poll at a fixed interval against a wall-clock deadline instead of
//! blocking indefinitely.

use std::thread;
use std::time::{Duration, Instant};

/// Poll interval and deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between two probes
    pub interval: Duration,
    /// Total budget measured from the first probe
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waited<T> {
    /// The probe produced a value
    Ready { value: T, elapsed: Duration },
    /// The deadline passed first
    TimedOut { elapsed: Duration },
}

impl<T> Waited<T> {
    /// Whether the probe succeeded before the deadline
    pub fn is_ready(&self) -> bool {
        matches!(self, Waited::Ready { .. })
    }

    /// Time spent waiting
    pub fn elapsed(&self) -> Duration {
        match self {
            Waited::Ready { elapsed, .. } | Waited::TimedOut { elapsed } => *elapsed,
        }
    }

    /// The produced value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Waited::Ready { value, .. } => Some(value),
            Waited::TimedOut { .. } => None,
        }
    }
}

impl WaitPolicy {
    /// Create a policy
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Poll `probe` until it yields `Some`, errors, or the deadline passes.
    ///
    /// The probe runs at least once, even with a zero timeout. Errors from the
    /// probe end the wait immediately.
    pub fn wait_for<T, E>(
        &self,
        mut probe: impl FnMut() -> Result<Option<T>, E>,
    ) -> Result<Waited<T>, E> {
        let start = Instant::now();
        loop {
            if let Some(value) = probe()? {
                return Ok(Waited::Ready {
                    value,
                    elapsed: start.elapsed(),
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Ok(Waited::TimedOut { elapsed });
            }
            thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}

/// Wait for a load-complete signal, tolerating a timeout.
///
/// Returns `None` once `is_loaded` reports true. When the budget runs out the
/// caller is expected to render anyway; the returned note describes the
/// timeout so it can be recorded with the attempt.
pub fn await_load<E>(
    policy: &WaitPolicy,
    what: &str,
    mut is_loaded: impl FnMut() -> Result<bool, E>,
) -> Result<Option<String>, E> {
    let waited = policy.wait_for(|| is_loaded().map(|loaded| loaded.then_some(())))?;

    match waited {
        Waited::Ready { elapsed, .. } => {
            tracing::debug!(what, elapsed_ms = elapsed.as_millis() as u64, "load complete");
            Ok(None)
        }
        Waited::TimedOut { elapsed } => {
            tracing::warn!(
                what,
                elapsed_ms = elapsed.as_millis() as u64,
                "load did not complete in time, rendering anyway"
            );
            Ok(Some(format!(
                "{} did not finish loading within {:.1}s; rendered best-effort",
                what,
                elapsed.as_secs_f64()
            )))
        }
    }
}
