//! Sliding-window text splitting with boundary preference.
//!
//! Segments are concatenated and covered by fixed-size character windows.
//! Consecutive windows share exactly `chunk_overlap` characters so context
//! spanning a boundary stays visible to retrieval. Where a window would cut
//! mid-text, the end is pulled back to the closest natural break, trying
//! paragraph, line, sentence, then word boundaries before falling back to a
//! hard character cut.

use thiserror::Error;
use uuid::Uuid;

use crate::loader::Segment;

/// Break candidates in priority order; the window end moves back to the
/// first kind found inside the window.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Separator inserted between segment texts before windowing.
const SEGMENT_JOINER: &str = "\n\n";

/// Errors raised while splitting text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Chunk size of zero cannot produce any window.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave room for the window to advance.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge {
        /// Configured overlap in characters.
        overlap: usize,
        /// Configured chunk size in characters.
        size: usize,
    },
}

/// A bounded text window used as the unit of retrieval.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Identifier assigned when the chunk is created.
    pub id: Uuid,
    /// Zero-based position of the chunk within the document.
    pub index: usize,
    /// Window text, including the overlap with the preceding chunk.
    pub text: String,
    /// File name the chunk originated from.
    pub source: String,
    /// Ordinals of the segments this window spans, for citation.
    pub segments: Vec<usize>,
}

/// Split ordered segments into overlapping chunks.
///
/// Segment texts are joined with a paragraph break and covered left to right;
/// every chunk is at most `chunk_size` characters and shares exactly
/// `chunk_overlap` characters with its predecessor. All input text is covered.
pub fn split_segments(
    segments: &[Segment],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if chunk_overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            overlap: chunk_overlap,
            size: chunk_size,
        });
    }

    let mut text = String::new();
    let mut segment_spans: Vec<(usize, usize, usize)> = Vec::with_capacity(segments.len());
    let mut cursor = 0usize;
    for segment in segments {
        if !text.is_empty() {
            text.push_str(SEGMENT_JOINER);
            cursor += SEGMENT_JOINER.chars().count();
        }
        let chars = segment.text.chars().count();
        segment_spans.push((cursor, cursor + chars, segment.ordinal));
        text.push_str(&segment.text);
        cursor += chars;
    }

    let source = segments
        .first()
        .map(|segment| segment.source.clone())
        .unwrap_or_default();

    let spans = window_spans(&text, chunk_size, chunk_overlap);
    let byte_offsets = char_byte_offsets(&text);

    let chunks = spans
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| Chunk {
            id: Uuid::new_v4(),
            index,
            text: text[byte_offsets[start]..byte_offsets[end]].to_string(),
            source: source.clone(),
            segments: segments_in_span(&segment_spans, start, end),
        })
        .collect();

    Ok(chunks)
}

/// Byte offset of every character boundary, plus the end of the string.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    offsets.push(text.len());
    offsets
}

/// Compute the character spans of each window over `text`.
fn window_spans(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, usize)> {
    let offsets = char_byte_offsets(text);
    let total = offsets.len() - 1;
    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < total {
        let mut end = (start + chunk_size).min(total);
        if end < total {
            end = preferred_break(text, &offsets, start, end, chunk_overlap);
        }
        spans.push((start, end));
        if end == total {
            break;
        }
        start = end - chunk_overlap;
    }

    spans
}

/// Move the window end back to the closest natural break, if one exists far
/// enough into the window for the next start to still advance.
fn preferred_break(
    text: &str,
    offsets: &[usize],
    start: usize,
    end: usize,
    chunk_overlap: usize,
) -> usize {
    let window = &text[offsets[start]..offsets[end]];
    let floor = start + chunk_overlap;
    for separator in SEPARATORS {
        if let Some(position) = window.rfind(separator) {
            let candidate = start + window[..position + separator.len()].chars().count();
            if candidate > floor {
                return candidate;
            }
        }
    }
    end
}

/// Ordinals of the segments overlapping the character span `[start, end)`.
fn segments_in_span(spans: &[(usize, usize, usize)], start: usize, end: usize) -> Vec<usize> {
    spans
        .iter()
        .filter(|(seg_start, seg_end, _)| *seg_start < end && *seg_end > start)
        .map(|(_, _, ordinal)| *ordinal)
        .collect()
}
