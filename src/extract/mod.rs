//! Document text extraction.
//!
//! Provides a trait-based interface so the pipeline can run against any
//! backend; the default one reads PDFs through pdfium.

mod pdfium;

pub use pdfium::PdfiumExtractor;

use crate::error::{ChatcastError, Result};
use async_trait::async_trait;
use std::io::Read;
use std::path::Path;

/// Trait for document text extraction backends.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of every page, concatenated in page order.
    ///
    /// Pages without extractable text contribute an empty string. Only an
    /// unreadable or corrupt document is an error.
    async fn extract(&self, path: &Path) -> Result<String>;
}

/// How far into the file the `%PDF-` header may start.
const HEADER_SEARCH_WINDOW: u64 = 1024;

/// Check that `path` exists, is readable and carries a `%PDF-` header.
///
/// Like pdfium, the header may be preceded by up to 1 KiB of leading bytes
/// (a BOM, line breaks, mail gateway residue).
pub fn validate_pdf(path: &Path) -> Result<()> {
    let file = std::fs::File::open(path).map_err(|e| {
        ChatcastError::Extraction(format!("Cannot open {}: {}", path.display(), e))
    })?;

    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW as usize);
    file.take(HEADER_SEARCH_WINDOW)
        .read_to_end(&mut head)
        .map_err(|e| {
            ChatcastError::Extraction(format!("Cannot read {}: {}", path.display(), e))
        })?;

    if !head.windows(5).any(|w| w == b"%PDF-") {
        return Err(ChatcastError::Extraction(format!(
            "{} is not a PDF document",
            path.display()
        )));
    }

    Ok(())
}
