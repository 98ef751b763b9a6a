//! Staging of the composed HTML on disk
//!
//! File-based converters need the document as a file. It is staged as a
//! hidden temporary file in the markdown's directory, so relative images and
//! links resolve as they do in the source. The file is removed on drop unless
//! the caller asks to keep it, or the run fails and the user needs it for a
//! manual conversion.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::backend::RenderResult;

/// The composed HTML written to disk
#[derive(Debug)]
pub struct StagedHtml {
    path: PathBuf,
    // Removed on drop unless persisted
    temp: Option<TempPath>,
}

impl StagedHtml {
    /// Write `html` to a temporary file in `dir`
    ///
    /// Without `dir`, or when `dir` is not writable, the system temporary
    /// directory is used.
    pub fn temporary(html: &str, dir: Option<&Path>) -> RenderResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".pressmark-").suffix(".html");

        let file = match dir {
            Some(dir) => builder.tempfile_in(dir).or_else(|e| {
                tracing::warn!(
                    dir = %dir.display(),
                    "cannot stage HTML beside the source, relative resources may not resolve: {}",
                    e
                );
                builder.tempfile()
            })?,
            None => builder.tempfile()?,
        };

        let temp = file.into_temp_path();
        fs::write(&temp, html)?;
        let path = temp.to_path_buf();
        tracing::debug!(path = %path.display(), "staged HTML");
        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    /// Current location of the HTML
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is removed on drop
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Copy the HTML to `target` and keep it there
    ///
    /// The temporary file is removed. Persisting twice to the same target is
    /// a no-op.
    pub fn persist(&mut self, target: &Path) -> RenderResult<&Path> {
        if self.temp.is_none() && self.path == target {
            return Ok(&self.path);
        }
        fs::copy(&self.path, target)?;
        self.path = target.to_path_buf();
        self.temp = None;
        tracing::debug!(path = %target.display(), "kept HTML");
        Ok(&self.path)
    }
}
