mod local;

pub use local::LocalIndex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ChunkMetadata, DocumentMeta, RetrieveFilters};

/// One embedded chunk as stored by the index: vector plus the denormalized
/// metadata needed for filtering and attribution at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub chunk: ChunkMetadata,
    pub document: DocumentMeta,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    /// Applied to the candidate set before scoring.
    pub filter: Option<RetrieveFilters>,
    pub return_metadata: bool,
}

#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    /// Present only when the query asked for metadata.
    pub metadata: Option<RecordMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub index_size_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Nearest-neighbor store over chunk embeddings. The retriever only reads
/// (`query`); ingestion owns all writes. Implementations are injected into
/// the retriever and ingestor, never reached through globals.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Configured vector dimensionality. Disagreement with the embedder is
    /// a deployment defect, checked before any network round-trip.
    fn dimensions(&self) -> usize;

    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<usize>;
    async fn query(&self, request: QueryRequest) -> Result<Vec<IndexMatch>>;
    async fn delete_by_ids(&self, ids: &[String]) -> Result<usize>;
    /// Cascade removal of every chunk belonging to one document.
    async fn delete_by_document(&self, document_id: &str) -> Result<usize>;
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChunkRecord>>;
    async fn load(&self) -> Result<()>;
    async fn persist(&self) -> Result<()>;
    async fn stats(&self) -> Result<IndexStats>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_or_empty() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}
