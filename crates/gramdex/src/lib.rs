//! Compact n-gram language index. This is the facade crate that wires
//! together the lower-level components:
//!
//! - [`gram_core`]: GramId and NodeRef handle types
//! - [`ef_sequence`]: Elias–Fano encoded monotone sequences
//! - [`ef_maps`]: compressed hash and rank-ordered child blocks
//! - [`gram_vocab`]: frequency-ranked vocabulary
//! - [`ef_trie`]: the arena trie, streaming build, and queries
//!
//! The index is built from a text corpus of pre-sorted n-gram counts, one
//! record per line: `w_1 w_2 … w_L \t count`. Construction runs two passes
//! over the text: the first counts token occurrences to freeze the
//! vocabulary, the second streams records into the trie. Malformed lines
//! are skipped in both passes.
//!
//! # Quick Start
//!
//! ```
//! use gramdex::NgramIndex;
//!
//! let corpus = "the cat ran\t3\nthe cat sat\t5\nthe dog sat\t2\n";
//! let index = NgramIndex::from_text(corpus, 3, 2).unwrap();
//!
//! assert_eq!(index.frequency_count(&["the", "cat"]), 8);
//! assert_eq!(index.most_likely_next(&["the", "cat"], 2), vec!["sat", "ran"]);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ef_maps::{EfHashMap, EfSortedMap};
pub use ef_sequence::EfSequence;
pub use ef_trie::{GramRecord, Trie, TrieNode};
pub use gram_core::{GRAM_ID_OFFSET, GramId, NodeRef};
pub use gram_vocab::{Vocabulary, VocabularyBuilder};

/// Errors surfaced while building an index.
///
/// Query misses are not errors: `frequency_count` returns 0 and
/// `most_likely_next` returns an empty vector.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The corpus file could not be read. Fatal at build entry.
    #[error("failed to read n-gram file: {0}")]
    Io(#[from] std::io::Error),

    /// The requested gram length cannot form a trie level structure.
    #[error("gram length must be at least 2, got {0}")]
    GramLenTooSmall(usize),

    /// The requested top-K width is below the minimum the child-block
    /// layout supports.
    #[error("top-k width must be at least 2, got {0}")]
    KTooSmall(usize),
}

/// Parse one corpus line into its tokens and count.
///
/// The line must split at a tab into a gram part of exactly `gram_len`
/// whitespace-separated tokens and a count part holding a positive
/// integer. Anything else (no tab, wrong token count, a stray tab inside
/// the count field, a zero or unparseable count) is malformed and yields
/// `None`.
pub fn parse_record(line: &str, gram_len: usize) -> Option<(Vec<&str>, u64)> {
    let (gram, count) = line.split_once('\t')?;
    let tokens: Vec<&str> = gram.split_whitespace().collect();
    if tokens.len() != gram_len {
        return None;
    }
    let count: u64 = count.trim().parse().ok()?;
    if count == 0 {
        return None;
    }
    Some((tokens, count))
}

/// An immutable n-gram index: vocabulary plus compressed trie.
#[derive(Debug, Serialize, Deserialize)]
pub struct NgramIndex {
    vocab: Vocabulary,
    trie: Trie,
    gram_len: usize,
}

impl NgramIndex {
    /// Build from a corpus file of sorted n-gram counts.
    pub fn from_path(path: impl AsRef<Path>, gram_len: usize, k: usize) -> Result<Self, BuildError> {
        let text = fs::read_to_string(path)?;
        Self::from_text(&text, gram_len, k)
    }

    /// Build from corpus text already in memory.
    ///
    /// An empty or entirely malformed corpus builds successfully; every
    /// query against it misses.
    pub fn from_text(text: &str, gram_len: usize, k: usize) -> Result<Self, BuildError> {
        if gram_len < 2 {
            return Err(BuildError::GramLenTooSmall(gram_len));
        }
        if k < 2 {
            return Err(BuildError::KTooSmall(k));
        }

        // Pass 1: occurrence counts over the token columns (the count
        // column does not weight the vocabulary).
        let mut builder = VocabularyBuilder::new();
        for line in text.lines() {
            if let Some((tokens, _)) = parse_record(line, gram_len) {
                for token in tokens {
                    builder.observe(token);
                }
            }
        }
        let vocab = builder.build();

        // Pass 2: stream records into the trie.
        let records = text.lines().filter_map(|line| {
            let (tokens, count) = parse_record(line, gram_len)?;
            let ids = tokens
                .iter()
                .map(|t| vocab.id(t))
                .collect::<Option<Vec<GramId>>>()?;
            Some(GramRecord::new(ids, count))
        });
        let trie = Trie::from_records(records, gram_len, k);

        Ok(NgramIndex {
            vocab,
            trie,
            gram_len,
        })
    }

    /// Exact occurrence count of the n-gram prefix `tokens`. Unknown words
    /// and absent prefixes count 0.
    pub fn frequency_count(&self, tokens: &[&str]) -> u64 {
        match self.resolve(tokens) {
            Some(ids) => self.trie.frequency_count(&ids),
            None => 0,
        }
    }

    /// Up to `n` most frequent continuations of `tokens`, descending.
    /// Unknown words and absent prefixes yield an empty vector.
    pub fn most_likely_next(&self, tokens: &[&str], n: usize) -> Vec<&str> {
        let Some(ids) = self.resolve(tokens) else {
            return Vec::new();
        };
        self.trie
            .most_likely_next(&ids, n)
            .into_iter()
            .filter_map(|id| self.vocab.word(id))
            .collect()
    }

    fn resolve(&self, tokens: &[&str]) -> Option<Vec<GramId>> {
        tokens.iter().map(|t| self.vocab.id(t)).collect()
    }

    /// The frozen vocabulary.
    #[inline]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The compressed trie.
    #[inline]
    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// The fixed gram length of the indexed corpus.
    #[inline]
    pub fn gram_len(&self) -> usize {
        self.gram_len
    }
}
