//! End-to-end conversion: markdown source to PDF on disk

use std::path::PathBuf;

use pressmark_core::{build_document, Cover, OutlineEntry};

use crate::attempt::{RenderReport, RunState};
use crate::backend::{RenderError, RenderJob, RenderOptions, RenderResult};
use crate::engine::RenderEngine;
use crate::inspect::PdfInfo;
use crate::staging::StagedHtml;

/// Inputs of one conversion
#[derive(Debug, Clone)]
pub struct ConvertRequest<'a> {
    /// Markdown source
    pub source: &'a str,
    /// Cover page content
    pub cover: Cover,
    /// CSS embedded in the composed document
    pub stylesheet: &'a str,
    /// Target PDF path
    pub output: PathBuf,
    /// Keep the composed HTML next to the PDF even on success
    pub keep_html: bool,
    /// Directory relative images and links resolve against, usually the
    /// markdown's own directory
    pub base_dir: Option<PathBuf>,
}

impl<'a> ConvertRequest<'a> {
    /// Where the composed HTML is kept, next to the PDF
    pub fn html_path(&self) -> PathBuf {
        self.output.with_extension("html")
    }

    /// Reject an output that the kept HTML would overwrite
    pub fn validate(&self) -> RenderResult<()> {
        if self.html_path() == self.output {
            return Err(RenderError::InvalidOutput(format!(
                "{} collides with the kept HTML; use a .pdf extension",
                self.output.display()
            )));
        }
        Ok(())
    }
}

/// Result of a conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Outline of the source
    pub outline: Vec<OutlineEntry>,
    /// Attempt log and terminal state
    pub report: RenderReport,
    /// Composed HTML left on disk, if any
    pub html: Option<PathBuf>,
    /// Size and pages of the produced PDF
    pub info: Option<PdfInfo>,
}

/// Compose the document, render it and keep what the user needs.
///
/// The composed HTML is kept when requested or when every backend failed,
/// so a manual conversion is always possible.
pub fn convert(
    request: &ConvertRequest<'_>,
    engine: &RenderEngine,
    options: &RenderOptions,
) -> RenderResult<Conversion> {
    request.validate()?;
    let built = build_document(request.source, &request.cover, request.stylesheet);
    let html_target = request.html_path();

    let mut staged = StagedHtml::temporary(&built.document.html, request.base_dir.as_deref())?;

    let job = RenderJob::new(built.document, staged.path(), &request.output).with_source(
        request.source,
        built.outline.clone(),
        request.cover.clone(),
    );

    let report = engine.render(&job, options);

    let html = match report.state {
        RunState::AllFailed => Some(staged.persist(&html_target)?.to_path_buf()),
        _ if request.keep_html => Some(staged.persist(&html_target)?.to_path_buf()),
        _ => None,
    };

    let info = report.output().and_then(|path| match PdfInfo::read(path) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not inspect PDF: {}", e);
            None
        }
    });

    Ok(Conversion {
        outline: built.outline,
        report,
        html,
        info,
    })
}
