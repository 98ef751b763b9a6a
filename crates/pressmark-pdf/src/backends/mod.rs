//! Render backend implementations
//!
//! Each backend wraps one way of turning the composed document into a PDF.
//! External tools are located on demand and never installed.

mod chrome;
mod cupsfilter;
mod enscript;
mod pandoc;
mod safari;
#[cfg(feature = "typst")]
mod typst;

use std::path::PathBuf;

use pressmark_core::RenderSettings;

use crate::backend::{BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult};

pub use chrome::ChromeBackend;
pub use cupsfilter::CupsfilterBackend;
pub use enscript::EnscriptBackend;
pub use pandoc::PandocBackend;
pub use safari::{OsaScriptDriver, SafariBackend, SafariDriver};
#[cfg(feature = "typst")]
pub use typst::TypstBackend;

/// Every backend name, in default priority order
pub const BACKEND_NAMES: &[&str] = &["chrome", "safari", "cupsfilter", "pandoc", "enscript", "typst"];

/// Per-backend configuration taken from the `[render]` settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Explicit Chrome/Chromium executable
    pub chrome_path: Option<PathBuf>,
    /// PDF engine passed to pandoc
    pub pandoc_engine: String,
    /// Font files for Typst
    pub fonts: Vec<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl BackendConfig {
    /// Configuration from the `[render]` section
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            chrome_path: settings.chrome_path.clone(),
            pandoc_engine: settings.pandoc_engine.clone(),
            fonts: settings.fonts.clone(),
        }
    }
}

/// Create a backend by name
pub fn backend_by_name(name: &str, config: &BackendConfig) -> RenderResult<Box<dyn PdfBackend>> {
    let backend: Box<dyn PdfBackend> = match name.trim().to_ascii_lowercase().as_str() {
        "chrome" => Box::new(ChromeBackend::new(config.chrome_path.clone())),
        "safari" => Box::new(SafariBackend::new()),
        "cupsfilter" => Box::new(CupsfilterBackend),
        "pandoc" => Box::new(PandocBackend::new(config.pandoc_engine.clone())),
        "enscript" => Box::new(EnscriptBackend),
        #[cfg(feature = "typst")]
        "typst" => Box::new(TypstBackend::new(config.fonts.clone())),
        #[cfg(not(feature = "typst"))]
        "typst" => Box::new(DisabledBackend {
            name: "typst",
            feature: "typst",
        }),
        _ => return Err(RenderError::UnknownBackend(name.to_string())),
    };
    Ok(backend)
}

/// A backend compiled out of this build
#[cfg_attr(feature = "typst", allow(dead_code))]
struct DisabledBackend {
    name: &'static str,
    feature: &'static str,
}

impl PdfBackend for DisabledBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn availability_hint(&self) -> String {
        format!("built without the `{}` feature", self.feature)
    }

    fn attempt(&self, _: &RenderJob, _: &RenderOptions) -> RenderResult<BackendOutput> {
        Err(RenderError::Unavailable(self.availability_hint()))
    }
}
