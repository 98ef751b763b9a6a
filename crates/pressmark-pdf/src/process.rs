//! External converter processes
//!
//! Runs command-line converters under the bounded wait primitive so a hung
//! tool is killed at its deadline instead of stalling the fallback chain.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use crate::backend::{RenderError, RenderResult};
use crate::wait::{WaitPolicy, Waited};

/// Maximum stderr characters carried into a diagnostic
const STDERR_TAIL: usize = 400;

/// Where a child's standard output goes
#[derive(Debug)]
pub enum StdoutTarget {
    /// Capture into [`ProcessOutput::stdout`]
    Capture,
    /// Write into a file (e.g. a converter that prints the PDF)
    File(File),
    /// Discard
    Discard,
}

/// A finished process
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status
    pub status: ExitStatus,
    /// Captured stdout (empty unless [`StdoutTarget::Capture`])
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Wall-clock run time
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// Fail unless the process exited successfully
    pub fn ensure_success(self, program: &str) -> RenderResult<Self> {
        if self.status.success() {
            return Ok(self);
        }
        let stderr = tail(self.stderr.trim(), STDERR_TAIL);
        Err(RenderError::Process(if stderr.is_empty() {
            format!("{} exited with {}", program, self.status)
        } else {
            format!("{} exited with {}: {}", program, self.status, stderr)
        }))
    }
}

/// Locate an executable on `PATH`
pub fn find_program(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Absolute form of a path without requiring it to exist
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// `file://` URL for a local path
pub fn file_url(path: &Path) -> io::Result<String> {
    let abs = absolute(path)?;
    let text = abs.to_string_lossy().replace('\\', "/");
    let encoded = text.replace('%', "%25").replace(' ', "%20").replace('#', "%23");
    if encoded.starts_with('/') {
        Ok(format!("file://{}", encoded))
    } else {
        Ok(format!("file:///{}", encoded))
    }
}

/// Run `command` to completion, killing it once `policy.timeout` elapses.
///
/// Stdin is closed and stderr is always captured. A missing executable is
/// reported as [`RenderError::Unavailable`].
pub fn run_with_timeout(
    command: &mut Command,
    stdout: StdoutTarget,
    policy: &WaitPolicy,
) -> RenderResult<ProcessOutput> {
    let program = command.get_program().to_string_lossy().into_owned();

    let mut stderr_file = tempfile::tempfile()?;
    let mut stdout_file = None;
    let stdout_stdio = match stdout {
        StdoutTarget::Capture => {
            let file = tempfile::tempfile()?;
            let stdio = Stdio::from(file.try_clone()?);
            stdout_file = Some(file);
            stdio
        }
        StdoutTarget::File(file) => Stdio::from(file),
        StdoutTarget::Discard => Stdio::null(),
    };

    command
        .stdin(Stdio::null())
        .stdout(stdout_stdio)
        .stderr(Stdio::from(stderr_file.try_clone()?));

    tracing::debug!(program = %program, timeout_ms = policy.timeout.as_millis() as u64, "spawning");
    let mut child = command.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RenderError::Unavailable(format!("{} not found", program)),
        _ => RenderError::Process(format!("failed to start {}: {}", program, e)),
    })?;

    match policy.wait_for(|| child.try_wait())? {
        Waited::Ready { value, elapsed } => Ok(ProcessOutput {
            status: value,
            stdout: match stdout_file.as_mut() {
                Some(file) => read_back(file)?,
                None => String::new(),
            },
            stderr: read_back(&mut stderr_file)?,
            elapsed,
        }),
        Waited::TimedOut { elapsed } => {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(program = %program, "process killed after timeout");
            Err(RenderError::Timeout {
                program,
                secs: elapsed.as_secs_f64(),
            })
        }
    }
}

fn read_back(file: &mut File) -> io::Result<String> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Last `max` characters of `text`
fn tail(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    let skip = count - max;
    let start = text
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..]
}
