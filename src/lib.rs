//! Ragent - Retrieval-Augmented QA Assistant
//!
//! A question-answering assistant that combines dense vector search (Qdrant),
//! sparse keyword search (in-memory BM25), and cross-encoder reranking, with
//! a secondary weather-lookup tool selected by a single-step intent router.

pub mod agent;
pub mod app;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod retrieval;
pub mod weather;

pub use error::{RagentError, Result};
