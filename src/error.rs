use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the ragent application
#[derive(Error, Debug)]
pub enum RagentError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(#[from] crate::embedding::EmbeddingError),

    /// Dense index errors
    #[error("Dense index error: {0}")]
    DenseIndex(#[from] crate::embedding::DenseIndexError),

    /// Sparse index errors
    #[error("Sparse index error: {0}")]
    SparseIndex(#[from] crate::embedding::SparseIndexError),

    /// Retrieval pipeline errors
    #[error("Retrieval error: {0}")]
    Retrieve(#[from] crate::retrieval::RetrieveError),

    /// Reranker errors
    #[error("Rerank error: {0}")]
    Rerank(#[from] crate::retrieval::RerankError),

    /// Language model errors
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    /// Weather tool errors
    #[error("Weather error: {0}")]
    Weather(#[from] crate::weather::WeatherError),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for ragent operations
pub type Result<T> = std::result::Result<T, RagentError>;
