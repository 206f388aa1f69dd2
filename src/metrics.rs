//! Append-only performance log and aggregate reporting.
//!
//! Every pipeline stage that completes appends one [`PerfEntry`] describing
//! what ran, how much data it touched, and how long it took. The log is owned
//! by one processing session, is never trimmed, and only ever grows;
//! [`PerformanceLog::summarize`] folds it into per-operation aggregates for
//! the presentation layer.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use time::OffsetDateTime;

use crate::loader::FileType;

/// A completed pipeline stage together with its size metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Text extraction from an uploaded file.
    DocumentLoading {
        /// Detected document format.
        file_type: FileType,
        /// Number of segments produced (pages for PDF).
        segment_count: usize,
    },
    /// Splitting segments into overlapping chunks.
    DocumentSplitting {
        /// Number of input segments.
        input_segments: usize,
        /// Number of chunks produced.
        output_chunks: usize,
    },
    /// Embedding chunks and inserting them into the vector index.
    IndexCreation {
        /// Number of chunks embedded and indexed.
        chunk_count: usize,
    },
    /// Retrieval plus grounded answer generation for one question.
    QueryProcessing {
        /// Length of the question in characters.
        query_chars: usize,
        /// Length of the generated answer in characters.
        answer_chars: usize,
    },
}

impl Operation {
    /// Discriminant used to group entries during aggregation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::DocumentLoading { .. } => OperationKind::DocumentLoading,
            Self::DocumentSplitting { .. } => OperationKind::DocumentSplitting,
            Self::IndexCreation { .. } => OperationKind::IndexCreation,
            Self::QueryProcessing { .. } => OperationKind::QueryProcessing,
        }
    }
}

/// Operation discriminant without per-kind payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Text extraction stage.
    DocumentLoading,
    /// Chunking stage.
    DocumentSplitting,
    /// Embedding and indexing stage.
    IndexCreation,
    /// Retrieval and generation stage.
    QueryProcessing,
}

/// Immutable record of one completed stage.
#[derive(Debug, Clone, Serialize)]
pub struct PerfEntry {
    /// What ran, with its size metrics.
    #[serde(flatten)]
    pub operation: Operation,
    /// Wall-clock duration of the stage.
    pub elapsed: Duration,
    /// UTC timestamp taken when the entry was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Ordered, append-only log of stage timings for one session.
#[derive(Debug, Default)]
pub struct PerformanceLog {
    entries: Vec<PerfEntry>,
}

impl PerformanceLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for a completed stage.
    pub fn record(&mut self, operation: Operation, elapsed: Duration) {
        let entry = PerfEntry {
            operation,
            elapsed,
            recorded_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!(entry = ?entry.operation, elapsed_ms = elapsed.as_millis() as u64, "Recorded stage timing");
        self.entries.push(entry);
    }

    /// All recorded entries in append order.
    pub fn entries(&self) -> &[PerfEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold the log into per-kind counts and mean durations.
    ///
    /// An empty log yields a summary with zero totals and no per-kind rows.
    pub fn summarize(&self) -> PerformanceSummary {
        let mut groups: BTreeMap<OperationKind, (usize, Duration)> = BTreeMap::new();
        let mut total_elapsed = Duration::ZERO;

        for entry in &self.entries {
            total_elapsed += entry.elapsed;
            let slot = groups
                .entry(entry.operation.kind())
                .or_insert((0, Duration::ZERO));
            slot.0 += 1;
            slot.1 += entry.elapsed;
        }

        let operations = groups
            .into_iter()
            .map(|(kind, (count, sum))| {
                (
                    kind,
                    OperationSummary {
                        count,
                        mean_seconds: sum.as_secs_f64() / count as f64,
                    },
                )
            })
            .collect();

        PerformanceSummary {
            total_operations: self.entries.len(),
            total_seconds: total_elapsed.as_secs_f64(),
            operations,
        }
    }
}

/// Aggregate view over one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperationSummary {
    /// Number of recorded entries of this kind.
    pub count: usize,
    /// Arithmetic mean elapsed time in seconds.
    pub mean_seconds: f64,
}

/// Aggregate view over the whole log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Total number of recorded entries.
    pub total_operations: usize,
    /// Grand total elapsed time across all entries, in seconds.
    pub total_seconds: f64,
    /// Per-kind counts and mean durations.
    pub operations: BTreeMap<OperationKind, OperationSummary>,
}
