//! In-memory similarity index scoped to one processing session.
//!
//! Holds `(vector, chunk)` pairs for a single uploaded document and answers
//! nearest-neighbor queries by cosine similarity. Nothing is persisted; the
//! index lives and dies with the session.

use crate::processing::Chunk;

/// Session-scoped nearest-neighbor index over embedded chunks.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug)]
struct IndexEntry {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// A retrieved chunk together with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Cosine similarity between the query and the chunk embedding.
    pub score: f32,
    /// The stored chunk payload.
    pub chunk: Chunk,
}

impl VectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an embedded chunk.
    pub fn insert(&mut self, vector: Vec<f32>, chunk: Chunk) {
        self.entries.push(IndexEntry { vector, chunk });
    }

    /// Return the `k` chunks nearest to the query vector, best first.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                score: cosine_similarity(&entry.vector, vector),
                chunk: entry.chunk.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity; zero when either vector has no magnitude or the
/// dimensions disagree.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(text: &str, index: usize) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            index,
            text: text.to_string(),
            source: "report.pdf".to_string(),
            segments: vec![0],
        }
    }

    #[test]
    fn query_orders_by_similarity() {
        let mut index = VectorIndex::new();
        index.insert(vec![1.0, 0.0], chunk("east", 0));
        index.insert(vec![0.0, 1.0], chunk("north", 1));
        index.insert(vec![0.7, 0.7], chunk("northeast", 2));

        let hits = index.query(&[1.0, 0.1], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "east");
        assert_eq!(hits[1].chunk.text, "northeast");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn query_clamps_k_to_index_size() {
        let mut index = VectorIndex::new();
        index.insert(vec![1.0, 0.0], chunk("only", 0));
        let hits = index.query(&[1.0, 0.0], 6);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = VectorIndex::new();
        assert!(index.is_empty());
        assert!(index.query(&[1.0], 3).is_empty());
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
