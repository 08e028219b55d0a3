//! RAG context pipeline for the Cong Nghe tutoring platform.
//!
//! Raw document text (already extracted upstream) flows through the
//! [`chunker`] into bounded, overlapping chunks; the [`ingest`] pipeline
//! embeds them and writes them to a [`index::VectorIndex`]. At query time
//! the [`retriever`] embeds the question, pulls filtered candidates from
//! the index and ranks them, and [`context`] renders the result into one
//! attribution-tagged block for prompt injection.
//!
//! The embedder and the vector index are narrow, injected collaborators;
//! [`index::LocalIndex`] is the bundled brute-force implementation.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod context;
pub mod embedder;
pub mod error;
pub mod index;
pub mod ingest;
pub mod retriever;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use chunker::{chunk_text, ChunkOptions, APPROX_CHARS_PER_TOKEN, DEFAULT_SEPARATORS};
pub use config::{ChunkingConfig, RagConfig, RetrievalConfig};
pub use context::build_context_string;
pub use embedder::{create_embedder, Embedder, EmbedderConfig, GeminiEmbedder};
pub use error::{RagError, Result};
pub use index::{
    ChunkRecord, IndexMatch, IndexStats, LocalIndex, QueryRequest, RecordMetadata, VectorIndex,
};
pub use ingest::Ingestor;
pub use retriever::Retriever;
pub use types::{
    ChunkMetadata, Document, DocumentChunk, DocumentMeta, Grade, RetrieveFilters, RetrievedChunk,
};
