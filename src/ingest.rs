use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::chunker::{chunk_text, ChunkOptions};
use crate::embedder::Embedder;
use crate::error::{RagError, Result};
use crate::index::{ChunkRecord, RecordMetadata, VectorIndex};
use crate::types::{ChunkMetadata, Document, DocumentChunk};

const EMBED_BATCH_SIZE: usize = 32;

/// Batch ingestion: chunk a document's extracted text, embed the chunks,
/// and upsert them into the vector index. Writes are exclusively owned by
/// this path; queries read whatever corpus snapshot currently exists.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    options: ChunkOptions,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        options: ChunkOptions,
    ) -> Self {
        Self {
            embedder,
            index,
            options,
        }
    }

    /// Chunks and indexes one document, returning the ingested chunks with
    /// their `embedding_id` back-references populated. Whitespace-only
    /// text yields an empty list and touches nothing.
    pub async fn ingest(&self, document: &Document, text: &str) -> Result<Vec<DocumentChunk>> {
        if self.embedder.dimensions() != self.index.dimensions() {
            return Err(RagError::DimensionMismatch {
                expected: self.index.dimensions(),
                actual: self.embedder.dimensions(),
            });
        }

        let mut chunks = chunk_text(text, &document.id, &self.options)?;
        if chunks.is_empty() {
            debug!(document_id = %document.id, "nothing to ingest");
            return Ok(chunks);
        }

        let document_meta = document.meta();
        let mut records = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks_mut(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "embedding batch returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            for (chunk, values) in batch.iter_mut().zip(vectors) {
                if values.len() != self.index.dimensions() {
                    return Err(RagError::DimensionMismatch {
                        expected: self.index.dimensions(),
                        actual: values.len(),
                    });
                }

                chunk.embedding_id = Some(chunk.id.clone());
                records.push(ChunkRecord {
                    id: chunk.id.clone(),
                    values,
                    metadata: RecordMetadata {
                        chunk: ChunkMetadata {
                            document_id: chunk.document_id.clone(),
                            chunk_index: chunk.chunk_index,
                            total_chunks: chunk.total_chunks,
                            content: chunk.content.clone(),
                        },
                        document: document_meta.clone(),
                    },
                    updated_at: Utc::now(),
                });
            }
        }

        let inserted = self.index.upsert(records).await?;
        info!(
            document_id = %document.id,
            chunks = inserted,
            "document ingested"
        );

        Ok(chunks)
    }

    /// Removes a document's chunks from the index. Returns the number of
    /// chunks deleted; zero is not an error.
    pub async fn remove_document(&self, document_id: &str) -> Result<usize> {
        let deleted = self.index.delete_by_document(document_id).await?;
        info!(document_id, chunks = deleted, "document removed");
        Ok(deleted)
    }
}
