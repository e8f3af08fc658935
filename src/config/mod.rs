//! Configuration loading, defaults and environment overrides

use crate::error::{RagentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub weather: WeatherConfig,
    pub corpus: CorpusConfig,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub vector_dim: usize,
}

/// Vector store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub api_key_env: String,
}

/// Hybrid retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub dense_k: usize,
    pub final_k: usize,
    pub dense_timeout_secs: u64,
    pub reranker_model: String,
}

/// Language model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Weather tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key_env: String,
    pub base_url: String,
}

/// Corpus location and chunking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagentError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RagentError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RagentError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| RagentError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: RAGENT_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("RAGENT_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "QDRANT__URL" => {
                self.qdrant.url = value.to_string();
            }
            "QDRANT__COLLECTION" => {
                self.qdrant.collection = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "LLM__BASE_URL" => {
                self.llm.base_url = value.to_string();
            }
            "LLM__MODEL" => {
                self.llm.model = value.to_string();
            }
            "RETRIEVAL__DENSE_K" => {
                self.retrieval.dense_k = parse_env(path, value)?;
            }
            "RETRIEVAL__FINAL_K" => {
                self.retrieval.final_k = parse_env(path, value)?;
            }
            "RETRIEVAL__DENSE_TIMEOUT_SECS" => {
                self.retrieval.dense_timeout_secs = parse_env(path, value)?;
            }
            "CORPUS__PATH" => {
                self.corpus.path = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RagentError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("ragent").join("config.toml"))
    }

    /// Resolve the vector store API key from the configured env var, if set.
    pub fn qdrant_api_key(&self) -> Option<String> {
        read_key(&self.qdrant.api_key_env)
    }

    /// Resolve the LLM API key from the configured env var, if set.
    pub fn llm_api_key(&self) -> Option<String> {
        read_key(&self.llm.api_key_env)
    }

    /// Resolve the weather API key from the configured env var, if set.
    pub fn weather_api_key(&self) -> Option<String> {
        read_key(&self.weather.api_key_env)
    }
}

fn read_key(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|k| !k.is_empty())
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| RagentError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}' as number", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                model: "bge-small-en-v1.5".to_string(),
                vector_dim: 384,
            },
            qdrant: QdrantConfig {
                url: "http://localhost:6334".to_string(),
                collection: "hybrid_rag_docs".to_string(),
                api_key_env: "QDRANT_API_KEY".to_string(),
            },
            retrieval: RetrievalConfig {
                dense_k: 10,
                final_k: 5,
                dense_timeout_secs: 10,
                reranker_model: "bge-reranker-base".to_string(),
            },
            llm: LlmConfig {
                base_url: "http://localhost:8000/v1".to_string(),
                model: "qwen2.5-7b-instruct".to_string(),
                api_key_env: "LLM_API_KEY".to_string(),
                temperature: 0.0,
                max_tokens: 256,
            },
            weather: WeatherConfig {
                api_key_env: "OPENWEATHER_API_KEY".to_string(),
                base_url: crate::weather::DEFAULT_BASE_URL.to_string(),
            },
            corpus: CorpusConfig {
                path: PathBuf::from("docs"),
                chunk_size: 1000,
                chunk_overlap: 100,
            },
        }
    }
}
