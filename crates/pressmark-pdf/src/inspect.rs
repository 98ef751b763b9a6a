//! Produced-PDF inspection
//!
//! Size and page count for the summary, plus the font check the in-process
//! typesetter uses to reject PDFs whose text cannot be drawn.

use std::path::Path;

use lopdf::Document;

use crate::backend::RenderResult;

/// Size and page count of a PDF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfInfo {
    /// File size in bytes
    pub bytes: u64,
    /// Number of pages, when the file parses as a PDF
    pub pages: Option<usize>,
}

impl PdfInfo {
    /// Inspect a PDF on disk
    ///
    /// Only a missing or unreadable file is an error; a file lopdf cannot
    /// parse just has no page count.
    pub fn read(path: &Path) -> RenderResult<Self> {
        let bytes = std::fs::metadata(path)?.len();
        let pages = Document::load(path).ok().map(|doc| doc.get_pages().len());
        Ok(Self { bytes, pages })
    }
}

/// Number of font dictionaries in an in-memory PDF
///
/// `None` when the bytes do not parse as a PDF.
pub fn font_count(data: &[u8]) -> Option<usize> {
    let doc = Document::load_mem(data).ok()?;
    let fonts = doc
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| {
            dict.get(b"Type")
                .and_then(|kind| kind.as_name())
                .map(|name| name == b"Font")
                .unwrap_or(false)
        })
        .count();
    Some(fonts)
}

/// Human-readable file size
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}
