use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

/// Failures surfaced by the pipeline.
///
/// Configuration problems (`ChunkingConfig`, `DimensionMismatch`, `Config`)
/// are fatal and never retried. `Timeout` is the only variant a caller is
/// expected to retry, with its own backoff policy. An empty result set is
/// never an error.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid chunking configuration: {0}")]
    ChunkingConfig(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{stage} did not respond within {timeout_ms}ms ({context})")]
    Timeout {
        stage: &'static str,
        timeout_ms: u64,
        context: String,
    },

    #[error("malformed vector index response: {0}")]
    MalformedIndexResponse(String),

    #[error("retrieval failed ({context}): {source}")]
    Retrieval {
        context: String,
        #[source]
        source: Box<RagError>,
    },

    #[error("embedding service error: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        RagError::Embedding(err.to_string())
    }
}
