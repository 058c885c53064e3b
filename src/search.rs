//! Query engine: ranks every chunk of an index snapshot against a query.
//!
//! # Ranking
//!
//! 1. Tokenize and vectorize the query.
//! 2. Score each chunk with [`cosine_similarity`].
//! 3. Stable sort by score (desc); equal scores keep index order.
//! 4. Truncate to `top_k`.
//!
//! Zero-scoring chunks are kept; the answer assembler applies its own
//! relevance threshold.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::index::Index;
use crate::models::ScoredChunk;
use crate::tokenize::Tokenizer;
use crate::vector::{cosine_similarity, vectorize};

/// Default number of results.
pub const DEFAULT_TOP_K: usize = 6;

/// Return the `top_k` chunks of `index` most similar to `query`.
///
/// An empty index (or `top_k == 0`) yields an empty result.
pub fn search(index: &Index, tokenizer: &Tokenizer, query: &str, top_k: usize) -> Vec<ScoredChunk> {
    let query_vec = vectorize(tokenizer.tokenize(query));

    let mut scored: Vec<ScoredChunk> = index
        .chunks()
        .iter()
        .map(|chunk| ScoredChunk {
            chunk: Arc::clone(chunk),
            score: cosine_similarity(&query_vec, &chunk.vector),
        })
        .collect();

    // `sort_by` is stable, which gives the index-order tie break.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use std::path::Path;

    fn index_of(texts: &[&str]) -> Index {
        let t = Tokenizer::default();
        Index::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    Chunk::new(Path::new("doc.md"), i, text.to_string(), vectorize(t.tokenize(text)))
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_index() {
        let results = search(&Index::default(), &Tokenizer::default(), "anything", 6);
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_chunk_match() {
        let index = index_of(&["zoho inventory setup guide"]);
        let results = search(&index, &Tokenizer::default(), "how to setup inventory", 6);
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.0);
        assert_eq!(results[0].chunk.id, "doc.md::0");
    }

    #[test]
    fn test_length_is_min_of_top_k_and_index() {
        let index = index_of(&["a", "b", "c", "d"]);
        let t = Tokenizer::default();
        assert_eq!(search(&index, &t, "a", 2).len(), 2);
        assert_eq!(search(&index, &t, "a", 10).len(), 4);
        assert_eq!(search(&index, &t, "a", 0).len(), 0);
    }

    #[test]
    fn test_scores_non_increasing() {
        let index = index_of(&[
            "warehouse transfer orders",
            "inventory setup for warehouse and items",
            "inventory inventory setup",
            "billing and invoices",
        ]);
        let results = search(&index, &Tokenizer::default(), "inventory setup warehouse", 10);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results.last().unwrap().score, 0.0);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let index = index_of(&["alpha beta", "gamma", "alpha beta", "alpha beta"]);
        let results = search(&index, &Tokenizer::default(), "alpha beta", 4);
        let ordinals: Vec<usize> = results.iter().map(|r| r.chunk.ordinal).collect();
        assert_eq!(ordinals, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_punctuation_only_query_scores_zero() {
        let index = index_of(&["alpha", "beta"]);
        let results = search(&index, &Tokenizer::default(), "?!", 6);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score == 0.0));
    }
}
