//! Headless Chrome/Chromium backend

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::process::{absolute, file_url, find_program, run_with_timeout, StdoutTarget};

/// Application bundles checked on macOS
const APP_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

/// Executable names looked up on `PATH`
const PROGRAM_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "microsoft-edge",
];

/// Prints the staged HTML with `--print-to-pdf`
#[derive(Debug, Clone, Default)]
pub struct ChromeBackend {
    explicit: Option<PathBuf>,
}

impl ChromeBackend {
    /// Backend that prefers `explicit` over discovery when set
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// The executable that would be used
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return path.is_file().then(|| path.clone());
        }
        APP_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .or_else(|| PROGRAM_NAMES.iter().find_map(|name| find_program(name)))
    }

    fn command(program: &Path, html: &Path, output: &Path) -> RenderResult<Command> {
        let mut cmd = Command::new(program);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", absolute(output)?.display()))
            .arg(file_url(html)?);
        Ok(cmd)
    }
}

impl PdfBackend for ChromeBackend {
    fn name(&self) -> &'static str {
        "chrome"
    }

    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    fn availability_hint(&self) -> String {
        match &self.explicit {
            Some(path) => format!("configured Chrome not found at {}", path.display()),
            None => "no Chrome or Chromium installation found".to_string(),
        }
    }

    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput> {
        let program = self
            .locate()
            .ok_or_else(|| RenderError::Unavailable(self.availability_hint()))?;
        tracing::debug!(program = %program.display(), "printing with chrome");

        let mut cmd = Self::command(&program, &job.html_path, job.output())?;
        run_with_timeout(&mut cmd, StdoutTarget::Discard, &options.process_policy())?
            .ensure_success("chrome")?;
        Ok(BackendOutput::new())
    }
}
