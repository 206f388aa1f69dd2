//! Pipeline service coordinating loading, chunking, embedding, indexing, and
//! answer generation for one processing session.

use std::path::Path;
use std::time::Instant;

use crate::{
    config::Config,
    embedding::{EmbeddingClient, EmbeddingServiceError, OpenAiEmbeddingClient},
    generation::{ChatClient, ChatRequest, ChatTurn, OpenAiChatClient},
    index::VectorIndex,
    loader::{self, Segment},
    metrics::{Operation, PerformanceLog, PerformanceSummary},
    processing::{
        chunking::{Chunk, split_segments},
        types::{Answer, ProcessingError},
    },
};

/// Coordinates the document-to-answer pipeline.
///
/// The processor owns the embedding and chat clients plus the session-scoped
/// performance log. One processor handles one uploaded document at a time and
/// then answers arbitrarily many questions against the index it produced.
/// Every stage is a single awaited call; a failure aborts the operation and
/// leaves the log holding entries only for the stages that completed.
pub struct DocumentProcessor {
    embedding_client: Box<dyn EmbeddingClient>,
    chat_client: Box<dyn ChatClient>,
    config: Config,
    performance: PerformanceLog,
}

impl DocumentProcessor {
    /// Build a processor with OpenAI-backed clients.
    ///
    /// The credential travels from `config` into each client constructor;
    /// nothing is written to process-global state.
    pub fn new(config: Config) -> Result<Self, ProcessingError> {
        let embedding_client = Box::new(OpenAiEmbeddingClient::new(&config)?);
        let chat_client = Box::new(OpenAiChatClient::new(&config)?);
        Ok(Self::with_clients(config, embedding_client, chat_client))
    }

    /// Build a processor with caller-supplied service clients.
    pub fn with_clients(
        config: Config,
        embedding_client: Box<dyn EmbeddingClient>,
        chat_client: Box<dyn ChatClient>,
    ) -> Self {
        Self {
            embedding_client,
            chat_client,
            config,
            performance: PerformanceLog::new(),
        }
    }

    /// Extract ordered text segments from a PDF or DOCX file.
    ///
    /// Records a loading entry on success; an unsupported extension or a
    /// parse failure is propagated and leaves the log untouched.
    pub fn load_document(&mut self, path: &Path) -> Result<Vec<Segment>, ProcessingError> {
        let started = Instant::now();
        let document = loader::load_document(path).map_err(|error| {
            tracing::error!(error = %error, path = %path.display(), "Document loading failed");
            ProcessingError::from(error)
        })?;
        let elapsed = started.elapsed();
        self.performance.record(
            Operation::DocumentLoading {
                file_type: document.file_type,
                segment_count: document.segments.len(),
            },
            elapsed,
        );
        tracing::info!(
            format = %document.file_type,
            segments = document.segments.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Document loaded"
        );
        Ok(document.segments)
    }

    /// Split segments into overlapping chunks using the configured sizing.
    pub fn split_segments(&mut self, segments: &[Segment]) -> Result<Vec<Chunk>, ProcessingError> {
        let started = Instant::now();
        let chunks = split_segments(segments, self.config.chunk_size, self.config.chunk_overlap)
            .map_err(|error| {
                tracing::error!(error = %error, "Document splitting failed");
                ProcessingError::from(error)
            })?;
        let elapsed = started.elapsed();
        self.performance.record(
            Operation::DocumentSplitting {
                input_segments: segments.len(),
                output_chunks: chunks.len(),
            },
            elapsed,
        );
        tracing::info!(
            segments = segments.len(),
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            elapsed_ms = elapsed.as_millis() as u64,
            "Document split into chunks"
        );
        Ok(chunks)
    }

    /// Embed every chunk and insert the vectors into a fresh session index.
    ///
    /// Embeddings are requested as one batch; if the service rejects any part
    /// of it the whole stage fails and no index is produced.
    pub async fn build_index(&mut self, chunks: Vec<Chunk>) -> Result<VectorIndex, ProcessingError> {
        let started = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedding_client
                .generate_embeddings(texts)
                .await
                .map_err(|error| {
                    tracing::error!(error = %error, "Embedding generation failed");
                    ProcessingError::from(error)
                })?
        };

        let mut index = VectorIndex::new();
        for (chunk, vector) in chunks.into_iter().zip(embeddings.into_iter()) {
            index.insert(vector, chunk);
        }

        let elapsed = started.elapsed();
        self.performance.record(
            Operation::IndexCreation {
                chunk_count: index.len(),
            },
            elapsed,
        );
        tracing::info!(
            chunks = index.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Vector index built"
        );
        Ok(index)
    }

    /// Run the full document pipeline: load, split, embed, index.
    pub async fn process_document(&mut self, path: &Path) -> Result<VectorIndex, ProcessingError> {
        let segments = self.load_document(path)?;
        let chunks = self.split_segments(&segments)?;
        self.build_index(chunks).await
    }

    /// Answer a question against the index, grounded in the nearest chunks.
    ///
    /// Retrieves the configured top-K chunks by similarity to the question's
    /// embedding, forwards them with the prior turns to the chat service, and
    /// returns the answer alongside the source chunks used.
    pub async fn answer(
        &mut self,
        index: &VectorIndex,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<Answer, ProcessingError> {
        let started = Instant::now();
        tracing::info!(question_chars = question.len(), "Answering question");

        let mut vectors = self
            .embedding_client
            .generate_embeddings(vec![question.to_string()])
            .await
            .map_err(|error| {
                tracing::error!(error = %error, "Question embedding failed");
                ProcessingError::from(error)
            })?;
        let query_vector = vectors.pop().ok_or_else(|| {
            ProcessingError::from(EmbeddingServiceError::MalformedResponse(
                "no vector returned for query".to_string(),
            ))
        })?;

        let hits = index.query(&query_vector, self.config.retrieval_top_k);
        let sources: Vec<Chunk> = hits.into_iter().map(|hit| hit.chunk).collect();

        let request = ChatRequest {
            question: question.to_string(),
            context: sources.iter().map(|chunk| chunk.text.clone()).collect(),
            history: history.to_vec(),
        };
        let text = self.chat_client.complete(&request).await.map_err(|error| {
            tracing::error!(error = %error, "Answer generation failed");
            ProcessingError::from(error)
        })?;

        let elapsed = started.elapsed();
        self.performance.record(
            Operation::QueryProcessing {
                query_chars: question.chars().count(),
                answer_chars: text.chars().count(),
            },
            elapsed,
        );
        tracing::info!(
            answer_chars = text.len(),
            sources = sources.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Question answered"
        );

        Ok(Answer { text, sources })
    }

    /// Aggregate view over the session's recorded stage timings.
    pub fn performance_summary(&self) -> PerformanceSummary {
        self.performance.summarize()
    }

    /// The session's append-only performance log.
    pub fn performance_log(&self) -> &PerformanceLog {
        &self.performance
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
