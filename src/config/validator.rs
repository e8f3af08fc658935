use crate::config::Config;
use crate::error::{RagentError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_embedding(config, &mut errors);
        Self::validate_qdrant(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_corpus(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RagentError::ConfigValidation { errors })
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.vector_dim == 0 {
            errors.push(ValidationError::new(
                "embedding.vector_dim",
                "Vector dimension must be greater than 0",
            ));
        }
    }

    fn validate_qdrant(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.qdrant.url.is_empty() {
            errors.push(ValidationError::new(
                "qdrant.url",
                "Vector store URL cannot be empty",
            ));
        }

        if config.qdrant.collection.is_empty() {
            errors.push(ValidationError::new(
                "qdrant.collection",
                "Collection name cannot be empty",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let retrieval = &config.retrieval;

        if retrieval.dense_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.dense_k",
                "dense_k must be greater than 0",
            ));
        }

        if retrieval.final_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.final_k",
                "final_k must be greater than 0",
            ));
        }

        // The merged candidate pool holds at most dense_k * 2 passages
        if retrieval.final_k > retrieval.dense_k * 2 {
            errors.push(ValidationError::new(
                "retrieval.final_k",
                format!(
                    "final_k ({}) cannot exceed twice dense_k ({})",
                    retrieval.final_k, retrieval.dense_k
                ),
            ));
        }

        if retrieval.dense_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "retrieval.dense_timeout_secs",
                "Dense search timeout must be greater than 0",
            ));
        }

        if retrieval.reranker_model.is_empty() {
            errors.push(ValidationError::new(
                "retrieval.reranker_model",
                "Reranker model name cannot be empty",
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.llm.base_url.is_empty() {
            errors.push(ValidationError::new(
                "llm.base_url",
                "Base URL cannot be empty",
            ));
        }

        if config.llm.model.is_empty() {
            errors.push(ValidationError::new(
                "llm.model",
                "Model name cannot be empty",
            ));
        }

        let temp = config.llm.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }
    }

    fn validate_corpus(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.corpus.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "corpus.path",
                "Corpus path cannot be empty",
            ));
        }

        if config.corpus.chunk_size == 0 {
            errors.push(ValidationError::new(
                "corpus.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if config.corpus.chunk_overlap >= config.corpus.chunk_size {
            errors.push(ValidationError::new(
                "corpus.chunk_overlap",
                format!(
                    "Chunk overlap ({}) must be smaller than chunk size ({})",
                    config.corpus.chunk_overlap, config.corpus.chunk_size
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn zero_dense_k_is_rejected() {
        let mut config = Config::default();
        config.retrieval.dense_k = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn final_k_above_the_pool_bound_is_rejected() {
        let mut config = Config::default();
        config.retrieval.dense_k = 2;
        config.retrieval.final_k = 5;
        assert!(ConfigValidator::validate(&config).is_err());

        config.retrieval.final_k = 4;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut config = Config::default();
        config.corpus.chunk_overlap = 1000;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn validation_collects_all_errors() {
        let mut config = Config::default();
        config.retrieval.dense_k = 0;
        config.retrieval.final_k = 0;
        config.llm.model = String::new();

        match ConfigValidator::validate(&config) {
            Err(RagentError::ConfigValidation { errors }) => {
                assert!(errors.len() >= 3);
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }
}
