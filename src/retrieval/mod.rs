//! Hybrid retrieval and reranking
//!
//! Combines dense vector search and sparse keyword search into one
//! deduplicated candidate pool, then reorders it with a cross-encoder.

mod deduplication;
mod hybrid;
mod reranker;

pub use deduplication::dedup_passages;
pub use hybrid::{
    HybridRetriever, RetrieveError, Retriever, RERANK_POOL_CAP, RERANK_TEXT_CHARS,
};
pub use reranker::{CrossEncoder, FastEmbedReranker, RerankError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of leading characters of passage content that form its
/// deduplication identity. Passages differing only after this prefix are
/// treated as duplicates.
pub const DEDUP_PREFIX_CHARS: usize = 200;

/// An immutable unit of retrievable text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Chunk text
    pub content: String,

    /// Source identifiers, page numbers, provenance tags
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        content: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Identity key for deduplication: the first [`DEDUP_PREFIX_CHARS`]
    /// characters of content. A lossy prefix key, not a content hash.
    /// Char-based so multibyte text never splits a UTF-8 boundary.
    pub fn identity_key(&self) -> String {
        self.content.chars().take(DEDUP_PREFIX_CHARS).collect()
    }
}

/// A passage paired with a reranker score. Exists only for the duration of
/// a single retrieve call.
#[derive(Debug, Clone)]
pub(crate) struct ScoredCandidate {
    pub passage: Passage,
    pub score: f32,
}
