//! Document processing pipeline: loading, chunking, indexing, and answering.

pub mod chunking;
mod service;
mod types;

pub use chunking::{Chunk, ChunkingError, split_segments};
pub use service::DocumentProcessor;
pub use types::{Answer, ProcessingError};
