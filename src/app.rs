//! Application wiring: startup initialization and dependency injection
//!
//! Every collaborator is constructed once, up front, in dependency order.
//! Failures surface here at startup instead of on the first query, and the
//! pipeline never reaches into global state.

use crate::agent::Agent;
use crate::config::Config;
use crate::embedding::{
    EmbeddingProvider, FastEmbedProvider, KeywordIndex, QdrantStore,
};
use crate::error::{RagentError, Result};
use crate::ingest;
use crate::llm::OpenAiCompatClient;
use crate::retrieval::{FastEmbedReranker, HybridRetriever};
use crate::weather::WeatherClient;
use std::sync::Arc;
use std::time::Duration;

/// All long-lived collaborators, built once at startup.
pub struct AppContext {
    config: Config,
    dense: Arc<QdrantStore>,
    sparse: Arc<KeywordIndex>,
    reranker: Arc<FastEmbedReranker>,
    llm: Arc<OpenAiCompatClient>,
    weather: Arc<WeatherClient>,
}

impl AppContext {
    /// Build the full pipeline from configuration.
    ///
    /// Order matters: embedder, then the vector store (which needs the
    /// embedder's dimension), then corpus load and idempotent ingestion,
    /// then the in-memory keyword index over the same corpus snapshot.
    pub async fn init(config: Config) -> Result<Self> {
        tracing::info!(model = %config.embedding.model, "Loading embedding model");
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(FastEmbedProvider::new(&config.embedding.model)?);

        if embedder.dimension() != config.embedding.vector_dim {
            return Err(RagentError::Config(format!(
                "Model {} produces {}-dim vectors but config expects {}",
                config.embedding.model,
                embedder.dimension(),
                config.embedding.vector_dim
            )));
        }

        tracing::info!(url = %config.qdrant.url, collection = %config.qdrant.collection, "Connecting to vector store");
        let dense = Arc::new(
            QdrantStore::connect(
                &config.qdrant.url,
                config.qdrant_api_key().as_deref(),
                &config.qdrant.collection,
                embedder.clone(),
            )
            .await?,
        );

        let passages = ingest::load_corpus(
            &config.corpus.path,
            config.corpus.chunk_size,
            config.corpus.chunk_overlap,
        )?;
        ingest::ingest_corpus(&dense, &passages).await?;

        let sparse = Arc::new(KeywordIndex::build(&passages)?);

        let reranker = Arc::new(FastEmbedReranker::new(&config.retrieval.reranker_model)?);

        let llm = Arc::new(OpenAiCompatClient::new(
            &config.llm.base_url,
            config.llm_api_key(),
            &config.llm.model,
            config.llm.temperature,
            config.llm.max_tokens,
        )?);

        let weather = Arc::new(WeatherClient::new(
            &config.weather.base_url,
            config.weather_api_key(),
        )?);

        tracing::info!("Pipeline initialized");

        Ok(Self {
            config,
            dense,
            sparse,
            reranker,
            llm,
            weather,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The hybrid retriever over the initialized indices.
    pub fn retriever(&self) -> Result<HybridRetriever> {
        let retrieval = &self.config.retrieval;
        Ok(HybridRetriever::new(
            self.dense.clone(),
            self.sparse.clone(),
            self.reranker.clone(),
            retrieval.dense_k,
            retrieval.final_k,
            Duration::from_secs(retrieval.dense_timeout_secs),
        )?)
    }

    /// The routed agent over the full pipeline.
    pub fn agent(&self) -> Result<Agent> {
        let retriever = Arc::new(self.retriever()?);
        Ok(Agent::new(
            self.llm.clone(),
            retriever,
            self.weather.clone(),
        ))
    }
}
