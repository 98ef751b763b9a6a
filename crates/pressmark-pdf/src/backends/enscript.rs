//! enscript + ps2pdf backend
//!
//! A plain-text fallback: the HTML is typeset as highlighted source, not
//! laid out as a page.

use std::process::Command;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::process::{find_program, run_with_timeout, StdoutTarget};

/// Converts through PostScript with `enscript` then `ps2pdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnscriptBackend;

impl PdfBackend for EnscriptBackend {
    fn name(&self) -> &'static str {
        "enscript"
    }

    fn is_available(&self) -> bool {
        find_program("enscript").is_some() && find_program("ps2pdf").is_some()
    }

    fn availability_hint(&self) -> String {
        match (find_program("enscript"), find_program("ps2pdf")) {
            (None, _) => "enscript not found on PATH".to_string(),
            _ => "ps2pdf (Ghostscript) not found on PATH".to_string(),
        }
    }

    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput> {
        let (Some(enscript), Some(ps2pdf)) = (find_program("enscript"), find_program("ps2pdf"))
        else {
            return Err(RenderError::Unavailable(self.availability_hint()));
        };

        // Intermediate PostScript is removed with the directory
        let work = tempfile::tempdir()?;
        let postscript = work.path().join("document.ps");
        let policy = options.process_policy();

        let mut cmd = Command::new(enscript);
        cmd.arg("-p")
            .arg(&postscript)
            .arg("--language=html")
            .arg(&job.html_path);
        run_with_timeout(&mut cmd, StdoutTarget::Discard, &policy)?.ensure_success("enscript")?;

        let mut cmd = Command::new(ps2pdf);
        cmd.arg(&postscript).arg(job.output());
        run_with_timeout(&mut cmd, StdoutTarget::Discard, &policy)?.ensure_success("ps2pdf")?;

        Ok(BackendOutput::new().with_diagnostic("rendered as plain text"))
    }
}
