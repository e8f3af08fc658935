//! Corpus loading, cleaning, chunking and upload
//!
//! One-time ETL: read plain-text sources, normalize whitespace, split into
//! overlapping chunks, embed and upload to the vector store. Running it
//! against a populated collection is a no-op, so the pipeline is idempotent.

use crate::embedding::QdrantStore;
use crate::error::{RagentError, Result};
use crate::retrieval::Passage;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

const SEPARATORS: [&str; 3] = ["\n\n", "\n", ". "];

/// Normalize whitespace in raw extracted text.
pub fn clean_text(text: &str) -> String {
    let ws = Regex::new(r"\s+").expect("static regex");
    ws.replace_all(text, " ").trim().to_string()
}

/// Split text into chunks of at most `chunk_size` characters, carrying
/// `overlap` trailing characters into the next chunk.
///
/// Separators are tried coarsest first; a segment that no separator can
/// break is hard-cut. A merged chunk may exceed `chunk_size` by at most the
/// overlap carried into it.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    let segments = segment(text, chunk_size, &SEPARATORS);

    let mut chunks = Vec::new();
    let mut current = String::new();
    for piece in segments {
        if !current.is_empty()
            && current.chars().count() + piece.chars().count() > chunk_size
        {
            let carried: String = current
                .chars()
                .skip(current.chars().count().saturating_sub(overlap))
                .collect();
            chunks.push(std::mem::take(&mut current));
            current = carried;
        }
        current.push_str(&piece);
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

fn segment(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    match separators.first() {
        Some(sep) => text
            .split_inclusive(sep)
            .filter(|piece| !piece.trim().is_empty())
            .flat_map(|piece| segment(piece, chunk_size, &separators[1..]))
            .collect(),
        None => hard_cut(text, chunk_size),
    }
}

fn hard_cut(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect()
}

/// Load and chunk every `.txt`/`.md` file under `path` (or `path` itself if
/// it is a file) into passages tagged with `{source, chunk}` metadata.
pub fn load_corpus(path: &Path, chunk_size: usize, overlap: usize) -> Result<Vec<Passage>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|e| RagentError::Io {
            source: e,
            context: format!("Failed to read corpus directory: {:?}", path),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| RagentError::Io {
                source: e,
                context: format!("Failed to read corpus directory: {:?}", path),
            })?;
            let file = entry.path();
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            if file.is_file() && matches!(ext, "txt" | "md") {
                files.push(file);
            }
        }
        files.sort();
    } else {
        return Err(RagentError::Config(format!(
            "Corpus path does not exist: {:?}",
            path
        )));
    }

    let mut passages = Vec::new();
    for file in &files {
        let raw = std::fs::read_to_string(file).map_err(|e| RagentError::Io {
            source: e,
            context: format!("Failed to read corpus file: {:?}", file),
        })?;

        let source = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        for (i, chunk) in split_text(&clean_text(&raw), chunk_size, overlap)
            .into_iter()
            .enumerate()
        {
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("chunk".to_string(), json!(i));
            passages.push(Passage::with_metadata(chunk, metadata));
        }
    }

    tracing::info!(
        files = files.len(),
        passages = passages.len(),
        "Loaded corpus"
    );

    Ok(passages)
}

/// Upload passages unless the collection already holds points.
/// Returns whether an upload happened.
pub async fn ingest_corpus(store: &QdrantStore, passages: &[Passage]) -> Result<bool> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!(existing, "Collection already populated, skipping ingestion");
        return Ok(false);
    }

    store.upsert_passages(passages).await?;
    tracing::info!(uploaded = passages.len(), "Ingestion completed");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(
            clean_text("  a\tb\n\nc   d  "),
            "a b c d"
        );
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_text("A short sentence.", 100, 10);
        assert_eq!(chunks, vec!["A short sentence.".to_string()]);
    }

    #[test]
    fn chunks_respect_the_size_bound() {
        let text = "A sentence about retrieval. ".repeat(50);
        let chunks = split_text(&text, 200, 40);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // A chunk may exceed the target only by the carried overlap
            assert!(chunk.chars().count() <= 240, "oversized chunk: {chunk:?}");
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "A sentence about retrieval. ".repeat(50);
        let chunks = split_text(&text, 200, 40);

        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .chars()
                .skip(pair[0].chars().count().saturating_sub(40))
                .collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn unbreakable_text_is_hard_cut() {
        let text = "x".repeat(500);
        let chunks = split_text(&text, 100, 0);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.chars().count() == 100));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("   ", 100, 10).is_empty());
    }

    #[test]
    fn corpus_files_become_tagged_passages() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        let mut f = std::fs::File::create(&file).unwrap();
        writeln!(f, "Hybrid RAG combines retrieval and generation.").unwrap();

        let passages = load_corpus(temp.path(), 1000, 100).unwrap();

        assert_eq!(passages.len(), 1);
        assert!(passages[0].content.contains("Hybrid RAG"));
        assert_eq!(passages[0].metadata["source"], json!("notes.txt"));
        assert_eq!(passages[0].metadata["chunk"], json!(0));
    }

    #[test]
    fn missing_corpus_path_is_a_config_error() {
        let result = load_corpus(Path::new("/nonexistent/corpus"), 1000, 100);
        assert!(matches!(result, Err(RagentError::Config(_))));
    }

    #[test]
    fn non_text_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("doc.pdf"), b"%PDF").unwrap();
        std::fs::write(temp.path().join("doc.md"), "Usable markdown text.").unwrap();

        let passages = load_corpus(temp.path(), 1000, 100).unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].metadata["source"], json!("doc.md"));
    }
}
