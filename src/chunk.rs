//! Word-boundary text chunker.
//!
//! Splits document text into consecutive, non-overlapping groups of at most
//! `max_words` whitespace-delimited words. Joining every chunk's words with
//! single spaces reproduces the document's word sequence exactly.

/// Default words per chunk.
pub const DEFAULT_MAX_WORDS: usize = 220;

/// Split `text` into chunks of at most `max_words` words, in order.
///
/// Returns an empty vector for empty or whitespace-only text.
/// `max_words` must be > 0; a zero is treated as 1 so the call never loops
/// or panics.
pub fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words)
        .map(|group| group.join(" "))
        .collect()
}
