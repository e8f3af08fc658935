//! Embedding generation and search index surfaces
//!
//! Architecture:
//! - `EmbeddingProvider` trait with a local FastEmbed implementation
//! - `DenseIndex` trait over a Qdrant-backed vector store
//! - `SparseIndex` trait over an in-memory tantivy BM25 index

mod keyword_index;
mod provider;
mod vector_store;

pub use keyword_index::{KeywordIndex, SparseIndexError};
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
pub use vector_store::{DenseIndexError, QdrantStore, CONTENT_PAYLOAD_KEY};

use crate::retrieval::Passage;
use async_trait::async_trait;

/// Nearest-neighbor search over embedded passages, backed by a durable
/// store reached over the network.
#[async_trait]
pub trait DenseIndex: Send + Sync {
    /// Top `k` passages by cosine similarity to the query's embedding.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, DenseIndexError>;
}

/// Lexical ranking over a fixed corpus snapshot held in memory.
///
/// `k` is a query-time argument; it is not baked into the index at
/// construction time.
pub trait SparseIndex: Send + Sync {
    fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, SparseIndexError>;
}
