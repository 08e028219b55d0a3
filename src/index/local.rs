use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

use super::{cosine_similarity, ChunkRecord, IndexMatch, IndexStats, QueryRequest, VectorIndex};

/// Records are kept in ingestion order so equal-score ties rank older
/// chunks first, keeping query results deterministic.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexData {
    records: Vec<ChunkRecord>,
}

/// Brute-force in-memory vector index with JSON persistence. Plenty for a
/// per-subject corpus of a few thousand chunks; anything larger belongs in
/// a real nearest-neighbor service behind the same trait.
pub struct LocalIndex {
    path: Option<PathBuf>,
    dimensions: usize,
    data: RwLock<IndexData>,
}

impl LocalIndex {
    pub fn new(path: PathBuf, dimensions: usize) -> Self {
        Self {
            path: Some(path),
            dimensions,
            data: RwLock::new(IndexData::default()),
        }
    }

    /// Index without a backing file, for fixture corpora in tests.
    pub fn in_memory(dimensions: usize) -> Self {
        Self {
            path: None,
            dimensions,
            data: RwLock::new(IndexData::default()),
        }
    }

    fn atomic_write(&self, path: &PathBuf, data: &IndexData) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec(data)?;
        fs::write(&temp_path, json)?;
        fs::rename(temp_path, path)?;

        Ok(())
    }

    fn check_dimensions(&self, len: usize) -> Result<()> {
        if len != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: len,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for LocalIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<usize> {
        for record in &records {
            self.check_dimensions(record.values.len())?;
        }

        let mut data = self.data.write().map_err(|e| RagError::Index(e.to_string()))?;
        let count = records.len();
        for record in records {
            match data.records.iter().position(|r| r.id == record.id) {
                Some(i) => data.records[i] = record,
                None => data.records.push(record),
            }
        }
        Ok(count)
    }

    async fn query(&self, request: QueryRequest) -> Result<Vec<IndexMatch>> {
        self.check_dimensions(request.vector.len())?;

        let data = self.data.read().map_err(|e| RagError::Index(e.to_string()))?;

        let mut matches: Vec<IndexMatch> = data
            .records
            .iter()
            .filter(|record| match &request.filter {
                Some(filter) => filter.matches(&record.metadata.document),
                None => true,
            })
            .map(|record| IndexMatch {
                id: record.id.clone(),
                score: cosine_similarity(&request.vector, &record.values),
                metadata: request.return_metadata.then(|| record.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(request.top_k);

        Ok(matches)
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<usize> {
        let mut data = self.data.write().map_err(|e| RagError::Index(e.to_string()))?;
        let before = data.records.len();
        data.records.retain(|r| !ids.contains(&r.id));
        Ok(before - data.records.len())
    }

    async fn delete_by_document(&self, document_id: &str) -> Result<usize> {
        let mut data = self.data.write().map_err(|e| RagError::Index(e.to_string()))?;
        let before = data.records.len();
        data.records
            .retain(|r| r.metadata.chunk.document_id != document_id);
        Ok(before - data.records.len())
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChunkRecord>> {
        let data = self.data.read().map_err(|e| RagError::Index(e.to_string()))?;
        Ok(data
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn load(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let content = fs::read(path)?;
        let loaded: IndexData = serde_json::from_slice(&content)?;

        let mut data = self.data.write().map_err(|e| RagError::Index(e.to_string()))?;
        *data = loaded;

        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = self.data.read().map_err(|e| RagError::Index(e.to_string()))?;
        self.atomic_write(path, &data)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let data = self.data.read().map_err(|e| RagError::Index(e.to_string()))?;

        let index_size_bytes = match &self.path {
            Some(path) if path.exists() => fs::metadata(path)?.len(),
            _ => 0,
        };

        let documents: HashSet<&str> = data
            .records
            .iter()
            .map(|r| r.metadata.chunk.document_id.as_str())
            .collect();

        Ok(IndexStats {
            total_documents: documents.len(),
            total_chunks: data.records.len(),
            index_size_bytes,
            last_updated: data.records.iter().map(|r| r.updated_at).max(),
        })
    }
}
