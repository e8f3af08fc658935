//! Hybrid retrieval combining dense and sparse search with reranking

use crate::embedding::{DenseIndex, SparseIndex};
use crate::retrieval::{dedup_passages, CrossEncoder, Passage, RerankError, ScoredCandidate};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on the deduplicated candidate pool passed to the
/// cross-encoder. Candidates beyond this rank are never reranked or
/// returned, bounding reranking latency.
pub const RERANK_POOL_CAP: usize = 8;

/// Passage content is truncated to this many characters before scoring.
/// Full-length scoring is not performed.
pub const RERANK_TEXT_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("Invalid retriever configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The underlying search surface could not be reached or failed.
    /// Callers decide on retry/backoff policy; the retriever does not retry.
    #[error("Retrieval unavailable ({path} path): {message}")]
    Unavailable { path: &'static str, message: String },

    #[error("Reranking failed: {0}")]
    Rerank(#[from] RerankError),
}

/// Query-to-passages interface implemented by the hybrid pipeline.
/// The agent depends on this seam so routing can be tested without indices.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrieveError>;
}

/// Hybrid retriever: dense + sparse search, dedup, cross-encoder rerank.
///
/// Holds read-only handles to both indices and the reranker for its
/// lifetime; retrieval never mutates them.
pub struct HybridRetriever {
    dense: Arc<dyn DenseIndex>,
    sparse: Arc<dyn SparseIndex>,
    reranker: Arc<dyn CrossEncoder>,
    dense_k: usize,
    final_k: usize,
    dense_timeout: Duration,
}

impl HybridRetriever {
    /// Create a new hybrid retriever.
    ///
    /// `dense_k` is the candidate count requested from each retrieval path,
    /// `final_k` the size of the returned result. Requires `dense_k >= 1`,
    /// `final_k >= 1` and `final_k <= dense_k * 2`.
    pub fn new(
        dense: Arc<dyn DenseIndex>,
        sparse: Arc<dyn SparseIndex>,
        reranker: Arc<dyn CrossEncoder>,
        dense_k: usize,
        final_k: usize,
        dense_timeout: Duration,
    ) -> Result<Self, RetrieveError> {
        if dense_k < 1 {
            return Err(RetrieveError::InvalidConfig(
                "dense_k must be at least 1".to_string(),
            ));
        }
        if final_k < 1 {
            return Err(RetrieveError::InvalidConfig(
                "final_k must be at least 1".to_string(),
            ));
        }
        if final_k > dense_k * 2 {
            return Err(RetrieveError::InvalidConfig(format!(
                "final_k ({final_k}) cannot exceed dense_k * 2 ({})",
                dense_k * 2
            )));
        }
        if final_k > RERANK_POOL_CAP {
            tracing::warn!(
                final_k,
                cap = RERANK_POOL_CAP,
                "final_k exceeds the rerank pool cap; results are bounded by the cap"
            );
        }

        Ok(Self {
            dense,
            sparse,
            reranker,
            dense_k,
            final_k,
            dense_timeout,
        })
    }

    /// Top `dense_k` passages by cosine similarity, under a deadline.
    ///
    /// A timeout degrades to sparse-only retrieval; a hard failure of the
    /// dense path surfaces as `Unavailable` with no fallback.
    async fn dense_search(&self, query: &str) -> Result<Vec<Passage>, RetrieveError> {
        match tokio::time::timeout(self.dense_timeout, self.dense.search(query, self.dense_k)).await
        {
            Ok(Ok(passages)) => Ok(passages),
            Ok(Err(e)) => Err(RetrieveError::Unavailable {
                path: "dense",
                message: e.to_string(),
            }),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.dense_timeout.as_millis() as u64,
                    "Dense search timed out, degrading to sparse-only results"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    /// Execute hybrid retrieval + reranking.
    ///
    /// Flow: query -> [dense + sparse] -> dedup -> cap -> rerank -> top k
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrieveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrieveError::InvalidQuery(
                "Query text cannot be empty".to_string(),
            ));
        }

        // Dense first, then sparse; the paths run sequentially and dense
        // passages take priority on dedup ties.
        let dense_results = self.dense_search(query).await?;
        let sparse_results =
            self.sparse
                .search(query, self.dense_k)
                .map_err(|e| RetrieveError::Unavailable {
                    path: "sparse",
                    message: e.to_string(),
                })?;

        tracing::debug!(
            dense = dense_results.len(),
            sparse = sparse_results.len(),
            "Merged retrieval candidates"
        );

        let mut combined = dense_results;
        combined.extend(sparse_results);

        let mut pool = dedup_passages(combined);
        pool.truncate(RERANK_POOL_CAP);

        // No relevant documents found; the reranker is not invoked.
        if pool.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = pool
            .iter()
            .map(|p| p.content.chars().take(RERANK_TEXT_CHARS).collect())
            .collect();

        let scores = self.reranker.score(query, &texts)?;
        if scores.len() != pool.len() {
            return Err(RetrieveError::Rerank(RerankError::Scoring(format!(
                "Expected {} scores, got {}",
                pool.len(),
                scores.len()
            ))));
        }

        let mut candidates: Vec<ScoredCandidate> = pool
            .into_iter()
            .zip(scores)
            .map(|(passage, score)| ScoredCandidate { passage, score })
            .collect();

        // Stable sort: equal scores keep their pre-sort (dense-before-
        // sparse, post-dedup) relative order.
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        candidates.truncate(self.final_k);

        Ok(candidates.into_iter().map(|c| c.passage).collect())
    }
}
