//! Document loading: turns a PDF or DOCX file into ordered text segments.
//!
//! PDF files produce one [`Segment`] per page; DOCX files produce a single
//! segment holding the whole document flow. Parse failures are surfaced as-is
//! and never retried.

mod docx;
mod pdf;

pub use docx::DocxError;

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while extracting text from an uploaded document.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File extension is neither `.pdf` nor `.docx`.
    #[error("Unsupported file format: '{extension}' (expected pdf or docx)")]
    UnsupportedFormat {
        /// Extension taken from the supplied path, lowercased; empty when absent.
        extension: String,
    },
    /// Reading the file from disk failed.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF parser rejected the file contents.
    #[error("Failed to parse PDF: {0}")]
    Pdf(#[from] pdf_extract::OutputError),
    /// The DOCX container or its XML could not be read.
    #[error("Failed to parse DOCX: {0}")]
    Docx(#[from] DocxError),
}

/// Supported document formats, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Portable Document Format; segmented by page.
    Pdf,
    /// Office Open XML word-processing document; a single text flow.
    Docx,
}

impl FileType {
    /// Determine the file type from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(LoaderError::UnsupportedFormat { extension }),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Docx => f.write_str("docx"),
        }
    }
}

/// A unit of raw extracted text with its position inside the source document.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Extracted text content.
    pub text: String,
    /// Zero-based page or section index within the document.
    pub ordinal: usize,
    /// File name the segment was extracted from, kept for citation.
    pub source: String,
}

/// A fully extracted document: its detected format plus ordered segments.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Format the loader detected from the path.
    pub file_type: FileType,
    /// Ordered text segments (pages for PDF, one flow for DOCX).
    pub segments: Vec<Segment>,
}

/// Extract ordered text segments from a PDF or DOCX file.
pub fn load_document(path: &Path) -> Result<LoadedDocument, LoaderError> {
    let file_type = FileType::from_path(path)?;
    let source = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    tracing::info!(file = %source, format = %file_type, "Loading document");

    let texts = match file_type {
        FileType::Pdf => pdf::extract_pages(path)?,
        FileType::Docx => vec![docx::extract_text(path)?],
    };

    let segments = texts
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Segment {
            text,
            ordinal,
            source: source.clone(),
        })
        .collect();

    Ok(LoadedDocument {
        file_type,
        segments,
    })
}
