//! Test doubles shared across module tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::embedder::Embedder;
use crate::error::Result;

/// Deterministic lookup-table embedder. Unknown text maps to the zero
/// vector, which scores 0 against everything.
pub(crate) struct MockEmbedder {
    dimensions: usize,
    table: HashMap<String, Vec<f32>>,
}

impl MockEmbedder {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            table: HashMap::new(),
        }
    }

    pub(crate) fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.table
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dimensions])
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.lookup(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.lookup(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
