mod gemini;

pub use gemini::GeminiEmbedder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Text-to-vector collaborator. Implementations must return vectors of
/// exactly `dimensions()` entries; a disagreement with the index is a
/// configuration defect, not a retryable condition.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
    async fn health_check(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub model: String,
    pub endpoint: Option<String>,
    /// Environment variable the API key is read from. The key itself never
    /// lives in the config file.
    pub api_key_env: String,
    pub dimensions: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            dimensions: 768,
        }
    }
}

pub fn create_embedder(config: &EmbedderConfig) -> Result<Box<dyn Embedder>> {
    let endpoint = config
        .endpoint
        .clone()
        .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());
    let api_key = std::env::var(&config.api_key_env).map_err(|_| {
        RagError::Config(format!(
            "embedding API key not found; set the {} environment variable",
            config.api_key_env
        ))
    })?;

    Ok(Box::new(GeminiEmbedder::new(
        &endpoint,
        &config.model,
        &api_key,
        config.dimensions,
    )))
}
