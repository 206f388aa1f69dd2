//! Per-page text extraction for PDF files.

use std::path::Path;

use super::LoaderError;

/// Extract the text of each page, in document order.
pub(crate) fn extract_pages(path: &Path) -> Result<Vec<String>, LoaderError> {
    let bytes = std::fs::read(path)?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)?;
    tracing::debug!(pages = pages.len(), "Extracted PDF pages");
    Ok(pages)
}
