//! Error taxonomy and result types for the processing pipeline.

use thiserror::Error;

use crate::embedding::EmbeddingServiceError;
use crate::generation::GenerationError;
use crate::loader::LoaderError;
use crate::processing::chunking::{Chunk, ChunkingError};

/// Errors emitted by the document processing pipeline.
///
/// Each variant wraps the underlying external failure with stage context.
/// Failures are logged and propagated unmodified; there is no retry and no
/// partial-result salvage.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Uploaded file has an extension the loader does not support.
    #[error(transparent)]
    UnsupportedFormat(LoaderError),
    /// Reading or parsing the document failed.
    #[error(transparent)]
    Load(LoaderError),
    /// Splitting the document into chunks failed.
    #[error(transparent)]
    Chunking(#[from] ChunkingError),
    /// Embedding service failed while indexing or answering.
    #[error(transparent)]
    Embedding(#[from] EmbeddingServiceError),
    /// Chat-completion service failed while answering.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<LoaderError> for ProcessingError {
    fn from(error: LoaderError) -> Self {
        match error {
            LoaderError::UnsupportedFormat { .. } => Self::UnsupportedFormat(error),
            _ => Self::Load(error),
        }
    }
}

/// A grounded answer together with the chunks it was grounded in.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Generated answer text.
    pub text: String,
    /// Retrieved source chunks the answer was grounded in, best match first.
    pub sources: Vec<Chunk>,
}
