//! PDF text extraction via pdfium.
//!
//! pdfium keeps thread-local state and is CPU-bound, so every extraction
//! runs on tokio's blocking pool.

use super::{validate_pdf, TextExtractor};
use crate::error::{ChatcastError, Result};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// pdfium-backed text extractor.
pub struct PdfiumExtractor {
    library_dir: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Create an extractor that binds to the system pdfium library.
    pub fn new() -> Self {
        Self { library_dir: None }
    }

    /// Prefer a pdfium library located in `dir`, falling back to the system library.
    pub fn with_library_dir(dir: Option<PathBuf>) -> Self {
        Self { library_dir: dir }
    }

    fn bind(library_dir: Option<&Path>) -> Result<Pdfium> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ChatcastError::Extraction(format!("pdfium library not available: {:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }

    /// Verify that a pdfium library can be bound.
    pub fn check_library(&self) -> Result<()> {
        Self::bind(self.library_dir.as_deref()).map(|_| ())
    }

    fn extract_blocking(path: &Path, library_dir: Option<&Path>) -> Result<String> {
        validate_pdf(path)?;

        let pdfium = Self::bind(library_dir)?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            ChatcastError::Extraction(format!("Corrupt PDF {}: {:?}", path.display(), e))
        })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        Ok(join_page_texts(
            pages.iter().map(|page| page.text().map(|text| text.all())),
        ))
    }
}

/// Concatenate page texts in order with no separator.
///
/// A page whose text cannot be read contributes an empty string.
fn join_page_texts<E: std::fmt::Debug>(
    pages: impl IntoIterator<Item = std::result::Result<String, E>>,
) -> String {
    let mut text = String::new();
    for (index, page) in pages.into_iter().enumerate() {
        match page {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!("Page {} has no extractable text: {:?}", index + 1, e),
        }
    }
    text
}

impl Default for PdfiumExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<String> {
        let path = path.to_path_buf();
        let library_dir = self.library_dir.clone();

        tokio::task::spawn_blocking(move || Self::extract_blocking(&path, library_dir.as_deref()))
            .await
            .map_err(|e| ChatcastError::Extraction(format!("Extraction task panicked: {}", e)))?
    }
}
