#![deny(missing_docs)]

//! Core library for the reportqa document question-answering pipeline.
//!
//! A document moves through the pipeline linearly: [`loader`] extracts ordered
//! text segments, [`processing`] splits them into overlapping chunks, embeds
//! them through [`embedding`], stores them in an in-memory [`index`], and
//! answers questions with [`generation`]. Every completed stage reports its
//! timing to the session-scoped log in [`metrics`].

/// Runtime configuration and credential handling.
pub mod config;
/// Embedding client abstraction and the OpenAI adapter.
pub mod embedding;
/// Chat-completion client abstraction and the OpenAI adapter.
pub mod generation;
/// In-memory cosine-similarity vector index.
pub mod index;
/// PDF and DOCX text extraction.
pub mod loader;
/// Structured logging and tracing setup.
pub mod logging;
/// Per-stage performance log and aggregation.
pub mod metrics;
/// Document processing pipeline orchestration.
pub mod processing;
