use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

use super::Embedder;

/// Embedder backed by the Google Generative Language API
/// (`text-embedding-004`, 768 dimensions in the deployed configuration).
pub struct GeminiEmbedder {
    endpoint: String,
    model: String,
    api_key: String,
    dimensions: usize,
    client: Client,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

impl GeminiEmbedder {
    pub fn new(endpoint: &str, model: &str, api_key: &str, dimensions: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            dimensions,
            client,
        }
    }

    fn request_for(&self, text: &str) -> EmbedRequest {
        EmbedRequest {
            model: format!("models/{}", self.model),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
        }
    }

    fn check_vector(&self, values: &[f32]) -> Result<()> {
        if values.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.request_for(t)).collect(),
        };

        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents?key={}",
            self.endpoint, self.model, self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RagError::Embedding(format!(
                        "cannot reach embedding service at {}",
                        self.endpoint
                    ))
                } else {
                    RagError::Embedding(format!("embedding request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "embedding service error ({}): {}",
                status, body
            )));
        }

        let parsed: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("unreadable embedding response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "embedding service returned {} vectors for {} inputs",
                parsed.embeddings.len(),
                texts.len()
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.embeddings.len());
        for embedding in parsed.embeddings {
            self.check_vector(&embedding.values)?;
            vectors.push(embedding.values);
        }

        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "{}/v1beta/models/{}?key={}",
            self.endpoint, self.model, self.api_key
        );

        let response = self.client.get(url).send().await.map_err(|_| {
            RagError::Embedding(format!(
                "cannot reach embedding service at {}",
                self.endpoint
            ))
        })?;

        if !response.status().is_success() {
            return Err(RagError::Embedding(format!(
                "model '{}' unavailable ({})",
                self.model,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_shape() {
        let embedder = GeminiEmbedder::new("https://example.com/", "text-embedding-004", "k", 768);
        assert_eq!(embedder.endpoint, "https://example.com");

        let request = BatchEmbedRequest {
            requests: vec![embedder.request_for("mạng máy tính")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requests"][0]["model"], "models/text-embedding-004");
        assert_eq!(
            json["requests"][0]["content"]["parts"][0]["text"],
            "mạng máy tính"
        );
    }

    #[test]
    fn test_batch_response_parse_and_dimension_check() {
        let embedder = GeminiEmbedder::new("https://example.com", "text-embedding-004", "k", 3);

        let parsed: BatchEmbedResponse =
            serde_json::from_str(r#"{"embeddings":[{"values":[0.1,0.2,0.3]}]}"#).unwrap();
        assert!(embedder.check_vector(&parsed.embeddings[0].values).is_ok());

        let short: BatchEmbedResponse =
            serde_json::from_str(r#"{"embeddings":[{"values":[0.1]}]}"#).unwrap();
        assert!(matches!(
            embedder.check_vector(&short.embeddings[0].values),
            Err(RagError::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }
}
