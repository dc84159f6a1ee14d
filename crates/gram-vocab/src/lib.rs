//! Frequency-ranked vocabulary mapping words to dense [`GramId`] values.
//!
//! The vocabulary maintains two parallel structures:
//! - `words`: words in ID order (index + [`GRAM_ID_OFFSET`] = GramId)
//! - `sorted_index`: GramIds sorted alphabetically by their word, for
//!   O(log n) lookup
//!
//! IDs are assigned by descending corpus frequency: the most frequent word
//! gets [`GRAM_ID_OFFSET`], the next gets one more, and so on. Frequent
//! words thus get the smallest IDs, which keeps the prefix-summed child
//! blocks downstream compact. The offset is mandatory because the
//! Elias–Fano encoder rejects values below 3.
//!
//! Counting and freezing are split: a [`VocabularyBuilder`] accumulates one
//! occurrence per token appearance, then [`VocabularyBuilder::build`]
//! ranks and freezes the result. A frozen [`Vocabulary`] is never mutated.

use std::collections::HashMap;

use gram_core::{GRAM_ID_OFFSET, GramId};
use serde::{Deserialize, Serialize};

/// Accumulates token occurrence counts before ranking.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    counts: HashMap<String, u64>,
}

impl VocabularyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `token`.
    pub fn observe(&mut self, token: &str) {
        *self.counts.entry(token.to_owned()).or_insert(0) += 1;
    }

    /// Rank tokens by descending occurrence count (ties broken by ascending
    /// word order, for determinism) and freeze the vocabulary.
    pub fn build(self) -> Vocabulary {
        let mut pairs: Vec<(String, u64)> = self.counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let words: Vec<String> = pairs.into_iter().map(|(word, _)| word).collect();

        let mut sorted_index: Vec<GramId> = (0..words.len()).map(GramId::from_rank).collect();
        sorted_index.sort_by(|&a, &b| words[index_of(a)].cmp(&words[index_of(b)]));

        Vocabulary { words, sorted_index }
    }
}

#[inline]
fn index_of(id: GramId) -> usize {
    (id.as_u32() - GRAM_ID_OFFSET) as usize
}

/// A frozen word ↔ [`GramId`] bijection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Words in ID order. `words[i]` belongs to `GramId(GRAM_ID_OFFSET + i)`.
    words: Vec<String>,
    /// GramIds sorted by the word they resolve to.
    sorted_index: Vec<GramId>,
}

impl Vocabulary {
    /// Look up the ID assigned to `word`. Returns `None` for words the
    /// corpus never produced.
    pub fn id(&self, word: &str) -> Option<GramId> {
        self.sorted_index
            .binary_search_by(|&id| self.words[index_of(id)].as_str().cmp(word))
            .ok()
            .map(|idx| self.sorted_index[idx])
    }

    /// Resolve an ID back to its word. Returns `None` for IDs outside the
    /// assigned range.
    pub fn word(&self, id: GramId) -> Option<&str> {
        id.as_u32()
            .checked_sub(GRAM_ID_OFFSET)
            .and_then(|idx| self.words.get(idx as usize))
            .map(String::as_str)
    }

    /// Number of distinct words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab_from(tokens: &[&str]) -> Vocabulary {
        let mut builder = VocabularyBuilder::new();
        for t in tokens {
            builder.observe(t);
        }
        builder.build()
    }

    #[test]
    fn most_frequent_word_gets_smallest_id() {
        let vocab = vocab_from(&["the", "the", "the", "cat", "cat", "sat"]);

        assert_eq!(vocab.id("the"), Some(GramId(3)));
        assert_eq!(vocab.id("cat"), Some(GramId(4)));
        assert_eq!(vocab.id("sat"), Some(GramId(5)));
    }

    #[test]
    fn ids_start_at_offset() {
        let vocab = vocab_from(&["only"]);
        assert_eq!(vocab.id("only"), Some(GramId(GRAM_ID_OFFSET)));
    }

    #[test]
    fn ties_break_by_word_order() {
        let vocab = vocab_from(&["banana", "apple", "cherry"]);

        assert_eq!(vocab.id("apple"), Some(GramId(3)));
        assert_eq!(vocab.id("banana"), Some(GramId(4)));
        assert_eq!(vocab.id("cherry"), Some(GramId(5)));
    }

    #[test]
    fn id_word_roundtrip() {
        let vocab = vocab_from(&["a", "a", "b", "c", "c", "c"]);

        for word in ["a", "b", "c"] {
            let id = vocab.id(word).unwrap();
            assert_eq!(vocab.word(id), Some(word));
        }
    }

    #[test]
    fn unknown_word_misses() {
        let vocab = vocab_from(&["known"]);
        assert_eq!(vocab.id("unknown"), None);
    }

    #[test]
    fn out_of_range_id_misses() {
        let vocab = vocab_from(&["one"]);
        assert_eq!(vocab.word(GramId(0)), None);
        assert_eq!(vocab.word(GramId(2)), None);
        assert_eq!(vocab.word(GramId(4)), None);
    }

    #[test]
    fn empty_builder_builds_empty_vocab() {
        let vocab = VocabularyBuilder::new().build();
        assert!(vocab.is_empty());
        assert_eq!(vocab.len(), 0);
        assert_eq!(vocab.id("anything"), None);
    }

    #[test]
    fn len_counts_distinct_words() {
        let vocab = vocab_from(&["x", "x", "y", "y", "y", "z"]);
        assert_eq!(vocab.len(), 3);
        assert!(!vocab.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let vocab = vocab_from(&["the", "the", "cat"]);
        let json = serde_json::to_string(&vocab).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back.id("the"), Some(GramId(3)));
        assert_eq!(back.word(GramId(4)), Some("cat"));
    }
}
