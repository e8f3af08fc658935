//! Cross-encoder reranking using FastEmbed

use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RerankError {
    #[error("Reranker initialization failed: {0}")]
    Initialization(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A model that jointly encodes (query, passage) pairs into relevance
/// scores.
///
/// Implementations return one score per input passage, **in input order**.
/// Sorting and tie-breaking are the caller's responsibility; this keeps the
/// stable-tie ordering policy in one place (the hybrid retriever).
pub trait CrossEncoder: Send + Sync {
    fn score(&self, query: &str, passages: &[String]) -> Result<Vec<f32>, RerankError>;
}

/// Cross-encoder reranker backed by a local FastEmbed model
pub struct FastEmbedReranker {
    model: Arc<TextRerank>,
}

impl FastEmbedReranker {
    pub fn new(model_name: &str) -> Result<Self, RerankError> {
        let reranker_model = match model_name {
            "bge-reranker-base" => RerankerModel::BGERerankerBase,
            "jina-reranker-v1-turbo-en" => RerankerModel::JINARerankerV1TurboEn,
            other => {
                return Err(RerankError::Initialization(format!(
                    "Unsupported reranker model: {}",
                    other
                )))
            }
        };

        tracing::info!(model = model_name, "Initializing cross-encoder reranker");

        let init_options =
            RerankInitOptions::new(reranker_model).with_show_download_progress(true);

        let model = TextRerank::try_new(init_options)
            .map_err(|e| RerankError::Initialization(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }
}

impl CrossEncoder for FastEmbedReranker {
    fn score(&self, query: &str, passages: &[String]) -> Result<Vec<f32>, RerankError> {
        if query.is_empty() {
            return Err(RerankError::InvalidInput(
                "Query cannot be empty".to_string(),
            ));
        }

        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<&str> = passages.iter().map(|s| s.as_str()).collect();

        let results = self
            .model
            .rerank(query, documents, false, None)
            .map_err(|e| RerankError::Scoring(e.to_string()))?;

        // FastEmbed returns results sorted by score; map back to input order
        let mut scores = vec![f32::NEG_INFINITY; passages.len()];
        for result in results {
            if result.index >= scores.len() {
                return Err(RerankError::Scoring(format!(
                    "Model returned out-of-range index {}",
                    result.index
                )));
            }
            scores[result.index] = result.score;
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_model_is_rejected() {
        let result = FastEmbedReranker::new("not-a-reranker");
        assert!(matches!(result, Err(RerankError::Initialization(_))));
    }

    #[test]
    #[ignore] // Requires model download
    fn scores_follow_input_order() {
        let reranker = FastEmbedReranker::new("bge-reranker-base").unwrap();

        let query = "What is the capital of France?";
        let passages = vec![
            "The weather is nice today.".to_string(),
            "Paris is the capital of France.".to_string(),
        ];

        let scores = reranker.score(query, &passages).unwrap();

        assert_eq!(scores.len(), 2);
        // Relevant passage scores higher, regardless of its input position
        assert!(scores[1] > scores[0]);
    }

    #[test]
    #[ignore] // Requires model download
    fn empty_query_rejected() {
        let reranker = FastEmbedReranker::new("bge-reranker-base").unwrap();
        let result = reranker.score("", &["text".to_string()]);
        assert!(result.is_err());
    }
}
