//! Qdrant-backed dense vector store

use crate::embedding::{DenseIndex, EmbeddingProvider};
use crate::retrieval::Passage;
use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Payload field holding the passage text; every other payload field is
/// treated as passage metadata.
pub const CONTENT_PAYLOAD_KEY: &str = "content";

#[derive(Error, Debug)]
pub enum DenseIndexError {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Collection setup failed: {0}")]
    Collection(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Upsert failed: {0}")]
    Upsert(String),

    #[error("Malformed point payload: {0}")]
    MalformedPayload(String),
}

/// Dense index over a Qdrant collection.
///
/// Connects once at startup; collection creation is idempotent (existence
/// is checked first). The vector dimension and cosine distance metric are
/// fixed configuration, not query-time parameters.
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl QdrantStore {
    /// Connect to the store and ensure the collection exists.
    pub async fn connect(
        url: &str,
        api_key: Option<&str>,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DenseIndexError> {
        if url.trim().is_empty() {
            return Err(DenseIndexError::Config(
                "Qdrant endpoint URL is not set".to_string(),
            ));
        }

        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }

        let client = builder
            .build()
            .map_err(|e| DenseIndexError::Connection(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            embedder,
        };
        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DenseIndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DenseIndexError::Connection(e.to_string()))?;

        if !exists {
            tracing::info!(collection = %self.collection, "Creating Qdrant collection");

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(
                            self.embedder.dimension() as u64,
                            Distance::Cosine,
                        ),
                    ),
                )
                .await
                .map_err(|e| DenseIndexError::Collection(e.to_string()))?;
        }

        Ok(())
    }

    /// Embed and upload passages, one point per passage.
    pub async fn upsert_passages(&self, passages: &[Passage]) -> Result<(), DenseIndexError> {
        if passages.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .map_err(|e| DenseIndexError::Embedding(e.to_string()))?;

        let start_id = self.count().await?;
        let mut points = Vec::with_capacity(passages.len());
        for (i, (passage, vector)) in passages.iter().zip(vectors).enumerate() {
            points.push(PointStruct::new(
                start_id + i as u64,
                vector,
                passage_payload(passage)?,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| DenseIndexError::Upsert(e.to_string()))?;

        Ok(())
    }

    /// Exact number of points in the collection
    pub async fn count(&self) -> Result<u64, DenseIndexError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DenseIndexError::Search(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}

#[async_trait]
impl DenseIndex for QdrantStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, DenseIndexError> {
        let vector = self
            .embedder
            .embed(query)
            .map_err(|e| DenseIndexError::Embedding(e.to_string()))?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, k as u64).with_payload(true),
            )
            .await
            .map_err(|e| DenseIndexError::Search(e.to_string()))?;

        response
            .result
            .into_iter()
            .map(|point| passage_from_payload(point.payload))
            .collect()
    }
}

fn passage_payload(passage: &Passage) -> Result<Payload, DenseIndexError> {
    let mut map = serde_json::Map::new();
    map.insert(
        CONTENT_PAYLOAD_KEY.to_string(),
        serde_json::Value::String(passage.content.clone()),
    );
    for (key, value) in &passage.metadata {
        map.insert(key.clone(), value.clone());
    }

    Payload::try_from(serde_json::Value::Object(map))
        .map_err(|e| DenseIndexError::MalformedPayload(e.to_string()))
}

fn passage_from_payload(
    payload: HashMap<String, qdrant_client::qdrant::Value>,
) -> Result<Passage, DenseIndexError> {
    let mut content = None;
    let mut metadata = HashMap::new();

    for (key, value) in payload {
        let json = value_to_json(value);
        if key == CONTENT_PAYLOAD_KEY {
            match json {
                serde_json::Value::String(text) => content = Some(text),
                other => {
                    return Err(DenseIndexError::MalformedPayload(format!(
                        "content field is not a string: {other}"
                    )))
                }
            }
        } else {
            metadata.insert(key, json);
        }
    }

    let content = content.ok_or_else(|| {
        DenseIndexError::MalformedPayload("point has no content field".to_string())
    })?;

    Ok(Passage::with_metadata(content, metadata))
}

fn value_to_json(value: qdrant_client::qdrant::Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::DoubleValue(f)) => serde_json::json!(f),
        Some(Kind::IntegerValue(i)) => serde_json::json!(i),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(nested)) => serde_json::Value::Object(
            nested
                .fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::Value;

    fn string_value(s: &str) -> Value {
        Value {
            kind: Some(Kind::StringValue(s.to_string())),
        }
    }

    #[test]
    fn payload_with_content_and_metadata_becomes_passage() {
        let mut payload = HashMap::new();
        payload.insert(
            CONTENT_PAYLOAD_KEY.to_string(),
            string_value("Qdrant is a vector database."),
        );
        payload.insert("source".to_string(), string_value("handbook.txt"));
        payload.insert(
            "page".to_string(),
            Value {
                kind: Some(Kind::IntegerValue(3)),
            },
        );

        let passage = passage_from_payload(payload).unwrap();

        assert_eq!(passage.content, "Qdrant is a vector database.");
        assert_eq!(passage.metadata["source"], serde_json::json!("handbook.txt"));
        assert_eq!(passage.metadata["page"], serde_json::json!(3));
    }

    #[test]
    fn payload_missing_content_is_rejected() {
        let mut payload = HashMap::new();
        payload.insert("source".to_string(), string_value("handbook.txt"));

        let result = passage_from_payload(payload);
        assert!(matches!(
            result,
            Err(DenseIndexError::MalformedPayload(_))
        ));
    }

    #[test]
    fn non_string_content_is_rejected() {
        let mut payload = HashMap::new();
        payload.insert(
            CONTENT_PAYLOAD_KEY.to_string(),
            Value {
                kind: Some(Kind::IntegerValue(42)),
            },
        );

        assert!(passage_from_payload(payload).is_err());
    }

    #[test]
    fn nested_values_convert_to_json() {
        let list = Value {
            kind: Some(Kind::ListValue(qdrant_client::qdrant::ListValue {
                values: vec![string_value("a"), string_value("b")],
            })),
        };

        assert_eq!(value_to_json(list), serde_json::json!(["a", "b"]));
    }
}
