use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Grade levels covered by the Cong Nghe curriculum. Closed set: documents
/// outside grades 10-12 are rejected at the boundary instead of carried
/// around as free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "11")]
    Eleven,
    #[serde(rename = "12")]
    Twelve,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::Ten => "10",
            Grade::Eleven => "11",
            Grade::Twelve => "12",
        };
        f.write_str(s)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10" => Ok(Grade::Ten),
            "11" => Ok(Grade::Eleven),
            "12" => Ok(Grade::Twelve),
            other => Err(format!("unknown grade '{}', expected 10, 11 or 12", other)),
        }
    }
}

/// A registered source text. Immutable once created; re-uploading the same
/// material produces a fresh `id`, and removal cascades to every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub grade: Grade,
    pub topic: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    /// sha256 prefix of the extracted text, used to spot duplicate uploads.
    pub content_hash: String,
}

impl Document {
    pub fn new(title: &str, grade: Grade, topic: &str, source: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            grade,
            topic: topic.to_string(),
            source: source.to_string(),
            created_at: Utc::now(),
            content_hash: hash_content(text),
        }
    }

    /// Denormalized projection stored alongside every chunk for
    /// attribution and filtering.
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            grade: self.grade,
            topic: self.topic.clone(),
            source: self.source.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub title: String,
    pub grade: Grade,
    pub topic: String,
    pub source: String,
}

/// A contiguous slice of a document's text, the unit of embedding and
/// retrieval. `start_index`/`end_index` are character offsets into the
/// original text; the slice at those offsets equals `content` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub start_index: usize,
    pub end_index: usize,
    /// Back-reference into the vector index, set once ingested.
    pub embedding_id: Option<String>,
}

/// Chunk projection carried through the vector index metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_id: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub content: String,
}

/// Query-time pairing of a chunk with its relevance score and the owning
/// document's metadata. Built per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: ChunkMetadata,
    pub document: DocumentMeta,
    pub score: f32,
}

/// Optional exact-match constraints applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieveFilters {
    pub grade: Option<Grade>,
    pub topic: Option<String>,
    pub source: Option<String>,
}

impl RetrieveFilters {
    pub fn is_empty(&self) -> bool {
        self.grade.is_none() && self.topic.is_none() && self.source.is_none()
    }

    /// True when every specified field matches the document exactly.
    pub fn matches(&self, doc: &DocumentMeta) -> bool {
        if let Some(grade) = self.grade {
            if doc.grade != grade {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            if &doc.topic != topic {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if &doc.source != source {
                return false;
            }
        }
        true
    }

    /// Compact form for diagnostics, e.g. "grade=11 topic=mạng".
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(grade) = self.grade {
            parts.push(format!("grade={}", grade));
        }
        if let Some(topic) = &self.topic {
            parts.push(format!("topic={}", topic));
        }
        if let Some(source) = &self.source {
            parts.push(format!("source={}", source));
        }
        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(" ")
        }
    }
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}
