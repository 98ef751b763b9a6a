//! In-process Typst backend
//!
//! Typesets the markdown source directly, so it needs no external tools and
//! is the last resort of the default chain. The HTML stylesheet does not
//! apply to this path.

use std::path::PathBuf;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::compiler::Compiler;
use crate::inspect::font_count;
use crate::transpiler::Transpiler;

/// Renders via markdown → Typst → PDF
#[derive(Debug, Clone, Default)]
pub struct TypstBackend {
    fonts: Vec<PathBuf>,
}

impl TypstBackend {
    /// Backend loading the given font files
    pub fn new(fonts: Vec<PathBuf>) -> Self {
        Self { fonts }
    }
}

impl PdfBackend for TypstBackend {
    fn name(&self) -> &'static str {
        "typst"
    }

    fn attempt(&self, job: &RenderJob, _options: &RenderOptions) -> RenderResult<BackendOutput> {
        if job.source.trim().is_empty() {
            return Err(RenderError::RenderFailed(
                "no markdown source attached to the job".to_string(),
            ));
        }

        let compiler = Compiler::with_font_files(&self.fonts)?;
        let markup = Transpiler::transpile(&job.source, &job.cover);
        tracing::debug!(bytes = markup.len(), fonts = compiler.font_count(), "compiling typst");

        let pdf = compiler.compile(&markup)?;
        // The cover always carries text, so a font-less PDF has invisible pages
        if font_count(&pdf) == Some(0) {
            return Err(RenderError::RenderFailed(
                "typeset PDF embeds no fonts; set [render] fonts".to_string(),
            ));
        }
        std::fs::write(job.output(), pdf)?;

        Ok(BackendOutput::new().with_diagnostic("stylesheet not applied (typeset from markdown)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressmark_core::{ComposedDocument, Cover};

    fn job(dir: &tempfile::TempDir, source: &str) -> RenderJob {
        let doc = ComposedDocument {
            title: "Guide".to_string(),
            html: String::new(),
        };
        RenderJob::new(doc, dir.path().join("doc.html"), dir.path().join("doc.pdf"))
            .with_source(source, Vec::new(), Cover::new("Guide"))
    }

    #[test]
    fn test_renders_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir, "# Guide\n\n## Install\n\nRun `make`.\n");

        let produced = TypstBackend::default()
            .attempt(&job, &RenderOptions::default())
            .unwrap();

        let bytes = std::fs::read(job.output()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(font_count(&bytes).unwrap() > 0);
        assert_eq!(produced.diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = TypstBackend::default().attempt(&job(&dir, "  \n"), &RenderOptions::default());
        assert!(matches!(result, Err(RenderError::RenderFailed(_))));
    }
}
