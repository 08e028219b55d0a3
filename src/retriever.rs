use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::embedder::Embedder;
use crate::error::{RagError, Result};
use crate::index::{QueryRequest, VectorIndex};
use crate::types::{RetrieveFilters, RetrievedChunk};

pub const DEFAULT_TOP_K: usize = 5;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrates one retrieval: embed the query, ask the index for
/// candidates matching the filters, drop zero-evidence matches, and return
/// the top-K ranked list. Read-only against the index; retries are the
/// caller's policy.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns at most `top_k` chunks sorted by descending relevance, ties
    /// kept in ingestion order. An empty list is a valid outcome, not a
    /// failure; callers degrade to generation without context.
    pub async fn retrieve_context(
        &self,
        query: &str,
        filters: Option<RetrieveFilters>,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if query.trim().is_empty() {
            warn!("empty query, skipping retrieval");
            return Ok(Vec::new());
        }

        if self.embedder.dimensions() != self.index.dimensions() {
            return Err(RagError::DimensionMismatch {
                expected: self.index.dimensions(),
                actual: self.embedder.dimensions(),
            });
        }

        // Error-level diagnostics carry a query prefix, never the full text.
        let diag = query_digest(query, filters.as_ref());

        let vector = timeout(self.timeout, self.embedder.embed(query))
            .await
            .map_err(|_| RagError::Timeout {
                stage: "embedder",
                timeout_ms: self.timeout.as_millis() as u64,
                context: diag.clone(),
            })?
            .map_err(|e| RagError::Retrieval {
                context: diag.clone(),
                source: Box::new(e),
            })?;

        let request = QueryRequest {
            vector,
            top_k,
            filter: filters,
            return_metadata: true,
        };

        let matches = timeout(self.timeout, self.index.query(request))
            .await
            .map_err(|_| RagError::Timeout {
                stage: "vector index",
                timeout_ms: self.timeout.as_millis() as u64,
                context: diag.clone(),
            })?
            .map_err(|e| RagError::Retrieval {
                context: diag.clone(),
                source: Box::new(e),
            })?;

        let mut results = Vec::with_capacity(matches.len());
        for m in matches {
            // Score <= 0 means no evidence of relevance.
            if m.score <= 0.0 {
                continue;
            }
            let metadata = m.metadata.ok_or_else(|| {
                RagError::MalformedIndexResponse(format!(
                    "match '{}' missing metadata ({})",
                    m.id, diag
                ))
            })?;
            results.push(RetrievedChunk {
                chunk: metadata.chunk,
                document: metadata.document,
                score: m.score,
            });
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        if results.is_empty() {
            warn!(%diag, "retrieval found no relevant chunks");
        } else {
            debug!(count = results.len(), %diag, "retrieval complete");
        }

        Ok(results)
    }
}

fn query_digest(query: &str, filters: Option<&RetrieveFilters>) -> String {
    let prefix: String = query.chars().take(24).collect();
    let ellipsis = if query.chars().count() > 24 { "…" } else { "" };
    let filter_summary = filters
        .map(RetrieveFilters::summary)
        .unwrap_or_else(|| "no filters".to_string());
    format!("query '{}{}', {}", prefix, ellipsis, filter_summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ChunkRecord, IndexMatch, IndexStats, LocalIndex, RecordMetadata};
    use crate::testing::MockEmbedder;
    use crate::types::{ChunkMetadata, DocumentMeta, Grade};
    use async_trait::async_trait;
    use chrono::Utc;

    fn record(
        id: &str,
        document_id: &str,
        grade: Grade,
        content: &str,
        values: Vec<f32>,
    ) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            values,
            metadata: RecordMetadata {
                chunk: ChunkMetadata {
                    document_id: document_id.to_string(),
                    chunk_index: 0,
                    total_chunks: 1,
                    content: content.to_string(),
                },
                document: DocumentMeta {
                    id: document_id.to_string(),
                    title: format!("Tin học {}", grade),
                    grade,
                    topic: "phần cứng".to_string(),
                    source: "SGK".to_string(),
                },
            },
            updated_at: Utc::now(),
        }
    }

    async fn sample_corpus() -> Arc<LocalIndex> {
        let index = Arc::new(LocalIndex::in_memory(4));
        index
            .upsert(vec![
                record(
                    "d1-chunk-0",
                    "d1",
                    Grade::Eleven,
                    "Mạng máy tính là tập hợp các máy tính được kết nối.",
                    vec![1.0, 0.2, 0.0, 0.0],
                ),
                record(
                    "d1-chunk-1",
                    "d1",
                    Grade::Eleven,
                    "Giao thức là tập hợp quy tắc truyền thông.",
                    vec![0.4, 1.0, 0.0, 0.0],
                ),
                record(
                    "d2-chunk-0",
                    "d2",
                    Grade::Ten,
                    "CPU là bộ xử lý trung tâm của máy tính.",
                    vec![0.0, 0.0, 1.0, 0.0],
                ),
            ])
            .await
            .unwrap();
        index
    }

    fn sample_embedder() -> Arc<MockEmbedder> {
        Arc::new(
            MockEmbedder::new(4)
                .with("mạng máy tính", vec![1.0, 0.0, 0.0, 0.0])
                .with("CPU", vec![0.0, 0.0, 1.0, 0.0]),
        )
    }

    #[tokio::test]
    async fn test_filters_and_ranking() {
        let retriever = Retriever::new(sample_embedder(), sample_corpus().await);

        let filters = RetrieveFilters {
            grade: Some(Grade::Eleven),
            ..Default::default()
        };
        let results = retriever
            .retrieve_context("mạng máy tính", Some(filters.clone()), 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].chunk.content.starts_with("Mạng máy tính"));
        for result in &results {
            assert!(filters.matches(&result.document));
        }
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_unrelated_query_returns_empty() {
        let retriever = Retriever::new(sample_embedder(), sample_corpus().await);

        // Unknown text embeds to the zero vector: cosine 0 everywhere, so
        // every candidate is dropped as zero-evidence.
        let results = retriever
            .retrieve_context("nonexistent unrelated gibberish query", None, 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_empty() {
        let retriever = Retriever::new(sample_embedder(), sample_corpus().await);
        let results = retriever.retrieve_context("   ", None, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_bound() {
        let retriever = Retriever::new(sample_embedder(), sample_corpus().await);

        let results = retriever
            .retrieve_context("mạng máy tính", None, 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.document_id, "d1");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_fast() {
        let embedder = Arc::new(MockEmbedder::new(8));
        let retriever = Retriever::new(embedder, sample_corpus().await);

        let result = retriever.retrieve_context("mạng máy tính", None, 5).await;
        assert!(matches!(
            result,
            Err(RagError::DimensionMismatch {
                expected: 4,
                actual: 8
            })
        ));
    }

    /// Embedder double that never answers in time.
    struct StallingEmbedder;

    #[async_trait]
    impl Embedder for StallingEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![0.0; 4])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn health_check(&self) -> crate::error::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_embedder_times_out() {
        let retriever = Retriever::new(Arc::new(StallingEmbedder), sample_corpus().await)
            .with_timeout(Duration::from_millis(5));

        let result = retriever.retrieve_context("mạng máy tính", None, 5).await;
        assert!(matches!(
            result,
            Err(RagError::Timeout {
                stage: "embedder",
                ..
            })
        ));
    }

    /// Index stub that returns matches stripped of metadata.
    struct HeadlessIndex;

    #[async_trait]
    impl VectorIndex for HeadlessIndex {
        fn dimensions(&self) -> usize {
            4
        }

        async fn upsert(&self, _records: Vec<ChunkRecord>) -> crate::error::Result<usize> {
            Ok(0)
        }

        async fn query(&self, _request: QueryRequest) -> crate::error::Result<Vec<IndexMatch>> {
            Ok(vec![IndexMatch {
                id: "d1-chunk-0".to_string(),
                score: 0.9,
                metadata: None,
            }])
        }

        async fn delete_by_ids(&self, _ids: &[String]) -> crate::error::Result<usize> {
            Ok(0)
        }

        async fn delete_by_document(&self, _document_id: &str) -> crate::error::Result<usize> {
            Ok(0)
        }

        async fn get_by_ids(&self, _ids: &[String]) -> crate::error::Result<Vec<ChunkRecord>> {
            Ok(Vec::new())
        }

        async fn load(&self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn persist(&self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn stats(&self) -> crate::error::Result<IndexStats> {
            Ok(IndexStats::default())
        }
    }

    #[tokio::test]
    async fn test_missing_metadata_is_malformed_response() {
        let retriever = Retriever::new(sample_embedder(), Arc::new(HeadlessIndex));

        let result = retriever.retrieve_context("mạng máy tính", None, 5).await;
        assert!(matches!(
            result,
            Err(RagError::MalformedIndexResponse(_))
        ));
    }

    #[test]
    fn test_query_digest_truncates() {
        let digest = query_digest(&"q".repeat(100), None);
        assert!(digest.contains(&"q".repeat(24)));
        assert!(!digest.contains(&"q".repeat(25)));
        assert!(digest.contains("…"));
        assert!(digest.contains("no filters"));
    }
}
