//! Typst to PDF compiler
//!
//! Compiles Typst markup to PDF bytes using typst-as-lib.
//!
//! Fonts come from the files the caller supplies, the host's installed fonts
//! and the fonts embedded in the binary, in that order of preference.

use std::path::PathBuf;

use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_as_lib::TypstEngine;

use crate::backend::{RenderError, RenderResult};

/// Compiler for converting Typst markup to PDF
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    fonts: Vec<Vec<u8>>,
}

impl Compiler {
    /// Compiler relying on system and embedded fonts only
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler that loads the given font files
    ///
    /// Every file is read up front so a missing font fails before compiling.
    pub fn with_font_files(paths: &[PathBuf]) -> RenderResult<Self> {
        let mut fonts = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(path).map_err(|e| {
                RenderError::RenderFailed(format!("failed to read font {}: {}", path.display(), e))
            })?;
            fonts.push(bytes);
        }
        Ok(Self { fonts })
    }

    /// Number of loaded fonts
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Compile Typst markup to PDF bytes
    pub fn compile(&self, markup: &str) -> RenderResult<Vec<u8>> {
        let engine = TypstEngine::builder()
            .main_file(markup.to_string())
            .fonts(self.fonts.clone())
            .search_fonts_with(
                TypstKitFontOptions::default()
                    .include_system_fonts(true)
                    .include_embedded_fonts(true),
            )
            .build();

        // compiled is Warned<Result<Document, Error>>
        let compiled = engine.compile();
        if !compiled.warnings.is_empty() {
            tracing::debug!(count = compiled.warnings.len(), "typst emitted warnings");
        }

        let document = compiled
            .output
            .map_err(|e| RenderError::RenderFailed(format!("typst compilation failed: {:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf_bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| RenderError::RenderFailed(format!("PDF generation failed: {:?}", e)))?;

        Ok(pdf_bytes.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple() {
        let result = Compiler::new().compile("= Hello World\n\nThis is a test document.");
        assert!(result.is_ok(), "Compilation failed: {:?}", result.err());
        assert!(result.unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_text_without_configured_fonts_embeds_a_font() {
        let pdf = Compiler::new()
            .compile("= Guide\n\nRun the installer.")
            .unwrap();
        let fonts = crate::inspect::font_count(&pdf).unwrap();
        assert!(fonts > 0, "no font resources in typeset PDF");
    }

    #[test]
    fn test_compile_error_is_render_failure() {
        let result = Compiler::new().compile("#let x = (");
        assert!(matches!(result, Err(RenderError::RenderFailed(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = Compiler::with_font_files(&[PathBuf::from("/nonexistent/font.ttf")]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("font.ttf"));
    }
}
