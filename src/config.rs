use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunker::{ChunkOptions, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS};
use crate::embedder::EmbedderConfig;
use crate::error::{RagError, Result};
use crate::retriever::DEFAULT_TOP_K;

/// Pipeline configuration, loadable from a TOML file with `[chunking]`,
/// `[embedder]` and `[retrieval]` tables. Every field has a default so a
/// missing file or partial table is fine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    pub embedder: EmbedderConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
        }
    }
}

impl ChunkingConfig {
    pub fn options(&self) -> ChunkOptions {
        ChunkOptions::new(self.max_tokens, self.overlap_tokens)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            timeout_secs: 30,
        }
    }
}

impl RagConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| RagError::Config(format!("{}: {}", path.display(), e)))
    }

    /// File config when present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.max_tokens, 500);
        assert_eq!(config.chunking.overlap_tokens, 100);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.embedder.dimensions, 768);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            max_tokens = 200

            [retrieval]
            top_k = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.max_tokens, 200);
        assert_eq!(config.chunking.overlap_tokens, 100);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.embedder.model, "text-embedding-004");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag.toml");
        std::fs::write(&path, "[embedder]\ndimensions = 384\n").unwrap();

        let config = RagConfig::load(&path).unwrap();
        assert_eq!(config.embedder.dimensions, 384);

        assert!(RagConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
