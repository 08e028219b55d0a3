use crate::types::RetrievedChunk;

/// Renders ranked chunks into one attribution-tagged block ready for
/// prompt injection. Input order is preserved; no re-ranking and no
/// truncation happen here — callers bound `top_k` and chunk size upstream.
///
/// An empty input yields an empty string so the prompt builder can omit
/// the context section entirely.
pub fn build_context_string(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return String::new();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(i, retrieved)| {
            format!(
                "[{}] Nguồn: {}\n{}",
                i + 1,
                retrieved.document.title,
                retrieved.chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
