//! In-memory tantivy keyword index with BM25 ranking

use crate::embedding::SparseIndex;
use crate::retrieval::Passage;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, ReloadPolicy, TantivyDocument};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparseIndexError {
    #[error("Index construction failed: {0}")]
    Build(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Malformed stored document: {0}")]
    Stored(String),
}

/// Keyword index over a fixed corpus snapshot.
///
/// Built entirely in RAM once per process during startup; there is no
/// persistence and no invalidation mechanism. A stale corpus requires a
/// process restart.
pub struct KeywordIndex {
    index: Index,
    reader: IndexReader,
    content_field: Field,
    metadata_field: Field,
}

impl KeywordIndex {
    /// Build the index from a corpus snapshot.
    pub fn build(passages: &[Passage]) -> Result<Self, SparseIndexError> {
        let mut schema_builder = Schema::builder();
        let content_field = schema_builder.add_text_field("content", TEXT | STORED);
        let metadata_field = schema_builder.add_text_field("metadata", STORED);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);

        let mut writer = index
            .writer(50_000_000)
            .map_err(|e| SparseIndexError::Build(e.to_string()))?;

        for passage in passages {
            let metadata_json = serde_json::to_string(&passage.metadata)
                .map_err(|e| SparseIndexError::Build(e.to_string()))?;

            writer
                .add_document(doc!(
                    content_field => passage.content.clone(),
                    metadata_field => metadata_json,
                ))
                .map_err(|e| SparseIndexError::Build(e.to_string()))?;
        }

        writer
            .commit()
            .map_err(|e| SparseIndexError::Build(e.to_string()))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| SparseIndexError::Build(e.to_string()))?;

        tracing::info!(passages = passages.len(), "Built in-memory keyword index");

        Ok(Self {
            index,
            reader,
            content_field,
            metadata_field,
        })
    }

    pub fn len(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SparseIndex for KeywordIndex {
    fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, SparseIndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        // Lenient parsing: user questions contain '?', quotes and other
        // query-syntax characters that must not fail the search.
        let query_parser = QueryParser::for_index(&self.index, vec![self.content_field]);
        let (parsed, _parse_errors) = query_parser.parse_query_lenient(query);

        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(k))
            .map_err(|e| SparseIndexError::Search(e.to_string()))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let stored: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| SparseIndexError::Search(e.to_string()))?;

            let content = stored
                .get_first(self.content_field)
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    SparseIndexError::Stored("document has no content field".to_string())
                })?
                .to_string();

            let metadata = match stored.get_first(self.metadata_field).and_then(|v| v.as_str()) {
                Some(json) => serde_json::from_str(json)
                    .map_err(|e| SparseIndexError::Stored(e.to_string()))?,
                None => Default::default(),
            };

            results.push(Passage::with_metadata(content, metadata));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn corpus() -> Vec<Passage> {
        vec![
            Passage::new("Qdrant is a vector database."),
            Passage::new("Hybrid RAG combines retrieval and generation."),
            Passage::new("The sky is blue."),
        ]
    }

    #[test]
    fn builds_and_counts() {
        let index = KeywordIndex::build(&corpus()).unwrap();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }

    #[test]
    fn empty_corpus_yields_empty_results() {
        let index = KeywordIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.search("anything", 5).unwrap().is_empty());
    }

    #[test]
    fn keyword_match_ranks_relevant_passage_first() {
        let index = KeywordIndex::build(&corpus()).unwrap();

        let results = index.search("retrieval generation", 3).unwrap();

        assert!(!results.is_empty());
        assert!(results[0].content.contains("Hybrid RAG"));
    }

    #[test]
    fn question_punctuation_is_tolerated() {
        let index = KeywordIndex::build(&corpus()).unwrap();

        let results = index.search("What is \"Hybrid RAG\"?", 3).unwrap();
        assert!(results.iter().any(|p| p.content.contains("Hybrid RAG")));
    }

    #[test]
    fn k_is_a_query_time_parameter() {
        // Same index handle, different k per call
        let index = KeywordIndex::build(&corpus()).unwrap();

        let one = index.search("is", 1).unwrap();
        let many = index.search("is", 3).unwrap();

        assert_eq!(one.len(), 1);
        assert!(many.len() > one.len());
        assert!(index.search("is", 0).unwrap().is_empty());
    }

    #[test]
    fn metadata_survives_the_round_trip() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), json!("handbook.txt"));
        metadata.insert("chunk".to_string(), json!(7));
        let passages = vec![Passage::with_metadata(
            "Reranking refines candidate order.",
            metadata,
        )];

        let index = KeywordIndex::build(&passages).unwrap();
        let results = index.search("reranking", 1).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["source"], json!("handbook.txt"));
        assert_eq!(results[0].metadata["chunk"], json!(7));
    }
}
