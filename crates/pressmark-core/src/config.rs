//! Configuration settings
//!
//! Settings are read from `pressmark.toml`:
//!
//! ```toml
//! [document]
//! title = "Brrow"
//! subtitle = "Complete System Documentation"
//! stylesheet = "pdf_styles.css"
//!
//! [render]
//! backends = ["chrome", "cupsfilter", "typst"]
//! min_bytes = 1000
//! load_timeout_secs = 30
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default configuration file name, looked up next to the input document
pub const CONFIG_FILE_NAME: &str = "pressmark.toml";

/// Backends tried when the configuration does not name any, in order
pub const DEFAULT_BACKENDS: &[&str] = &["chrome", "safari", "cupsfilter", "pandoc", "enscript", "typst"];

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Cover and stylesheet settings
    pub document: DocumentSettings,
    /// Render backend settings
    pub render: RenderSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a file, resolving relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load `pressmark.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Make every relative path absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        if let Some(ref mut css) = self.document.stylesheet {
            resolve(css);
        }
        if let Some(ref mut chrome) = self.render.chrome_path {
            resolve(chrome);
        }
        for font in &mut self.render.fonts {
            resolve(font);
        }
    }
}

/// Cover page and styling
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentSettings {
    /// Cover title; defaults to the first level 1 heading or the file name
    pub title: Option<String>,
    /// Cover subtitle
    pub subtitle: Option<String>,
    /// CSS file embedded in the composed document
    pub stylesheet: Option<PathBuf>,
}

/// Render strategy settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Backend names in priority order
    pub backends: Vec<String>,
    /// A PDF must be larger than this many bytes to count as produced
    pub min_bytes: u64,
    /// Interval between readiness polls
    pub poll_interval_ms: u64,
    /// Budget for asynchronous document loading
    pub load_timeout_secs: u64,
    /// Budget for external converter processes
    pub process_timeout_secs: u64,
    /// Explicit Chrome/Chromium executable
    pub chrome_path: Option<PathBuf>,
    /// PDF engine passed to pandoc
    pub pandoc_engine: String,
    /// Font files for the in-process Typst backend
    pub fonts: Vec<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            backends: DEFAULT_BACKENDS.iter().map(|s| s.to_string()).collect(),
            min_bytes: 1000,
            poll_interval_ms: 100,
            load_timeout_secs: 30,
            process_timeout_secs: 60,
            chrome_path: None,
            pandoc_engine: "context".to_string(),
            fonts: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Load timeout as a duration
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Process timeout as a duration
    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }
}
