//! Plain-text extraction for DOCX files.
//!
//! A DOCX file is a zip container; the document body lives in
//! `word/document.xml` as WordprocessingML. Extraction walks the XML once,
//! collecting run text (`<w:t>`) and turning paragraph ends, line breaks, and
//! tabs into plain whitespace.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

const DOCUMENT_XML: &str = "word/document.xml";

/// Errors raised while reading a DOCX container.
#[derive(Debug, Error)]
pub enum DocxError {
    /// The zip container could not be opened or is missing the document part.
    #[error("invalid DOCX container: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Reading the document part from the archive failed.
    #[error("failed to read document part: {0}")]
    Io(#[from] std::io::Error),
    /// The document XML is malformed.
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Extract the full text flow of a DOCX file.
pub(crate) fn extract_text(path: &Path) -> Result<String, DocxError> {
    let file = File::open(path).map_err(DocxError::Io)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_XML)?.read_to_string(&mut xml)?;
    let text = text_from_document_xml(&xml)?;
    tracing::debug!(chars = text.len(), "Extracted DOCX text");
    Ok(text)
}

/// Pull paragraph text out of WordprocessingML.
fn text_from_document_xml(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"w:t" => in_run_text = true,
                b"w:tab" => out.push('\t'),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_run_text => out.push_str(&text.unescape()?),
            Event::End(element) => match element.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
