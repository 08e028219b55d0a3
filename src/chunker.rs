use crate::error::{RagError, Result};
use crate::types::DocumentChunk;

/// Rough chars-per-token conversion used for every size knob in the
/// pipeline. The embedder's real tokenizer lives on the remote side; this
/// approximation is the single definition site the chunk-size contract is
/// measured against.
pub const APPROX_CHARS_PER_TOKEN: usize = 4;

/// Boundary strings tried in priority order when closing a chunk.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOptions {
    /// Chunk size ceiling, in approximated tokens.
    pub max_tokens: usize,
    /// Overlap between consecutive chunks, in approximated tokens. When the
    /// overlap would stall the cursor it silently degrades to zero for that
    /// step so the pass always terminates.
    pub overlap_tokens: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ChunkOptions {
    pub fn new(max_tokens: usize, overlap_tokens: usize) -> Self {
        Self {
            max_tokens,
            overlap_tokens,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(RagError::ChunkingConfig(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn max_chars(&self) -> usize {
        self.max_tokens * APPROX_CHARS_PER_TOKEN
    }

    fn overlap_chars(&self) -> usize {
        self.overlap_tokens * APPROX_CHARS_PER_TOKEN
    }
}

/// Splits `text` into bounded, overlapping chunks, preferring to break at
/// natural boundaries. Pure and deterministic: identical input always
/// yields byte-identical chunks.
///
/// Chunk ids are `{document_id}-chunk-{index}` with indices `0..N-1` and
/// every chunk's `total_chunks` set to the final count. Offsets are
/// character positions into `text` such that the slice at
/// `[start_index, end_index)` equals `content`. Whitespace-only windows
/// are dropped without consuming an index.
pub fn chunk_text(
    text: &str,
    document_id: &str,
    options: &ChunkOptions,
) -> Result<Vec<DocumentChunk>> {
    options.validate()?;
    if document_id.is_empty() {
        return Err(RagError::ChunkingConfig(
            "document_id must not be empty".to_string(),
        ));
    }

    let chars: Vec<char> = text.chars().collect();
    let total_len = chars.len();
    let max_chars = options.max_chars();
    let overlap_chars = options.overlap_chars();
    let separators: Vec<Vec<char>> = options
        .separators
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.chars().collect())
        .collect();

    let mut chunks: Vec<DocumentChunk> = Vec::new();
    let mut cursor = 0usize;

    while cursor < total_len {
        let candidate = (cursor + max_chars).min(total_len);
        let mut end = candidate;

        if candidate < total_len {
            // The boundary must fall in the second half of the window so a
            // chunk is never less than half the target size.
            let min_boundary = cursor + max_chars / 2;
            if let Some(boundary) = find_boundary(&chars, candidate, min_boundary, &separators) {
                end = boundary;
            }
        }

        if let Some((start_index, end_index)) = trim_window(&chars, cursor, end) {
            let chunk_index = chunks.len();
            chunks.push(DocumentChunk {
                id: format!("{}-chunk-{}", document_id, chunk_index),
                document_id: document_id.to_string(),
                content: chars[start_index..end_index].iter().collect(),
                chunk_index,
                total_chunks: 0,
                start_index,
                end_index,
                embedding_id: None,
            });
        }

        if end >= total_len {
            break;
        }

        let next = end.saturating_sub(overlap_chars);
        cursor = if next > cursor { next } else { end };
    }

    let total = chunks.len();
    for chunk in &mut chunks {
        chunk.total_chunks = total;
    }

    Ok(chunks)
}

/// Searches backward from `candidate` for the highest-priority separator
/// ending no earlier than `min_boundary`. Returns the position just past
/// the separator, so the separator stays with the earlier chunk.
fn find_boundary(
    chars: &[char],
    candidate: usize,
    min_boundary: usize,
    separators: &[Vec<char>],
) -> Option<usize> {
    for sep in separators {
        if sep.len() > candidate {
            continue;
        }
        let mut pos = candidate - sep.len();
        loop {
            if pos < min_boundary {
                break;
            }
            if chars[pos..pos + sep.len()] == sep[..] {
                return Some(pos + sep.len());
            }
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
    }
    None
}

/// Shrinks `[start, end)` past leading and trailing whitespace. Returns
/// `None` when nothing remains.
fn trim_window(chars: &[char], mut start: usize, mut end: usize) -> Option<(usize, usize)> {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    if start == end {
        None
    } else {
        Some((start, end))
    }
}
