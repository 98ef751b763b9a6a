//! pandoc backend

use std::path::Path;
use std::process::Command;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::process::{find_program, run_with_timeout, StdoutTarget};

/// Converts the staged HTML with `pandoc --pdf-engine=<engine>`
#[derive(Debug, Clone)]
pub struct PandocBackend {
    engine: String,
}

impl PandocBackend {
    /// Backend using the given PDF engine
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }

    /// Whether the engine's executable is on `PATH`
    fn engine_present(&self) -> bool {
        find_program(&self.engine).is_some()
    }

    fn command(&self, program: &Path, html: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg(html)
            .arg("-o")
            .arg(output)
            .arg(format!("--pdf-engine={}", self.engine));
        cmd
    }
}

impl PdfBackend for PandocBackend {
    fn name(&self) -> &'static str {
        "pandoc"
    }

    fn is_available(&self) -> bool {
        find_program("pandoc").is_some() && self.engine_present()
    }

    fn availability_hint(&self) -> String {
        if find_program("pandoc").is_none() {
            "pandoc not found on PATH".to_string()
        } else {
            format!("pandoc PDF engine `{}` not found on PATH", self.engine)
        }
    }

    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput> {
        let program = find_program("pandoc")
            .ok_or_else(|| RenderError::Unavailable(self.availability_hint()))?;
        if !self.engine_present() {
            return Err(RenderError::Unavailable(self.availability_hint()));
        }

        let mut cmd = self.command(&program, &job.html_path, job.output());
        run_with_timeout(&mut cmd, StdoutTarget::Discard, &options.process_policy())?
            .ensure_success("pandoc")?;
        Ok(BackendOutput::new())
    }
}
