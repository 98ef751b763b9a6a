//! CUPS `cupsfilter` backend
//!
//! `cupsfilter` converts the HTML through the print system's filter chain and
//! writes the PDF to standard output.

use std::fs::File;
use std::process::Command;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::process::{find_program, run_with_timeout, StdoutTarget};

/// Converts through `cupsfilter`
#[derive(Debug, Clone, Copy, Default)]
pub struct CupsfilterBackend;

impl PdfBackend for CupsfilterBackend {
    fn name(&self) -> &'static str {
        "cupsfilter"
    }

    fn is_available(&self) -> bool {
        find_program("cupsfilter").is_some()
    }

    fn availability_hint(&self) -> String {
        "cupsfilter not found on PATH".to_string()
    }

    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput> {
        let program = find_program("cupsfilter")
            .ok_or_else(|| RenderError::Unavailable(self.availability_hint()))?;

        let sink = File::create(job.output())?;
        let mut cmd = Command::new(program);
        cmd.arg(&job.html_path);

        let finished = run_with_timeout(&mut cmd, StdoutTarget::File(sink), &options.process_policy())?
            .ensure_success("cupsfilter")?;

        let stderr = finished.stderr.trim();
        if !stderr.is_empty() {
            tracing::debug!("cupsfilter: {}", stderr);
        }
        Ok(BackendOutput::new())
    }
}
