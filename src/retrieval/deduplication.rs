//! Passage deduplication by content-prefix identity

use crate::retrieval::Passage;
use std::collections::HashSet;

/// Deduplicate passages by identity key, keeping the first occurrence of
/// each key and preserving input order.
///
/// The caller concatenates dense results before sparse results, so a passage
/// found by both paths survives with the dense path's metadata.
pub fn dedup_passages(passages: Vec<Passage>) -> Vec<Passage> {
    let mut seen: HashSet<String> = HashSet::new();

    passages
        .into_iter()
        .filter(|p| seen.insert(p.identity_key()))
        .collect()
}
