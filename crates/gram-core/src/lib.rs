//! Core identifier types shared by the gramdex index crates.
//!
//! This crate defines the two handle newtypes the rest of the workspace is
//! built on: [`GramId`], the dense integer a vocabulary assigns to a word,
//! and [`NodeRef`], an index into a trie's node arena. Both are plain
//! integers that do not borrow the structures they point into, which lets
//! child blocks and query walks hold arbitrarily many of them while the
//! owning trie is elsewhere.
//!
//! Compressed child blocks store both kinds of handle inside Elias–Fano
//! sequences, whose encoder rejects values below 3. Gram IDs carry the
//! offset directly ([`GRAM_ID_OFFSET`]); node references are offset on the
//! way into a sequence and un-offset on the way out.

use serde::{Deserialize, Serialize};

/// Smallest ID a vocabulary may assign.
///
/// The Elias–Fano encoder requires every stored value to be at least 3, so
/// the most frequent word gets ID 3 and ranks count up from there. IDs 0–2
/// are never valid gram IDs.
pub const GRAM_ID_OFFSET: u32 = 3;

/// Dense identifier assigned to a vocabulary word.
///
/// IDs are allocated contiguously from [`GRAM_ID_OFFSET`] in descending
/// order of corpus frequency: the most frequent word gets the smallest ID.
/// Smaller IDs compress better in the prefix-summed child blocks.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct GramId(pub u32);

impl GramId {
    /// The raw u32 value.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Widen to u64 for Elias–Fano encoding and hashing.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0 as u64
    }

    /// Build the ID for frequency rank `rank` (0 = most frequent).
    ///
    /// # Panics
    /// Panics if the resulting ID would overflow u32.
    #[inline]
    pub fn from_rank(rank: usize) -> Self {
        let id = u32::try_from(rank)
            .ok()
            .and_then(|r| r.checked_add(GRAM_ID_OFFSET))
            .unwrap_or_else(|| panic!("GramId overflow: rank {rank}"));
        GramId(id)
    }
}

/// Opaque handle into a trie's node arena.
///
/// A plain index; it does not borrow the arena. The design this replaces
/// packed raw heap addresses into the compressed child blocks and recovered
/// pointers by differencing; dense arena indices give the same prefix-sum
/// encoding without the undefined behavior.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeRef(u32);

impl NodeRef {
    /// Create from an arena index.
    ///
    /// # Panics
    /// Panics if `index` exceeds u32::MAX.
    #[inline]
    pub fn from_usize(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "NodeRef overflow: {index}");
        NodeRef(index as u32)
    }

    /// Convert to usize for indexing into the arena.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Widen to u64 for Elias–Fano encoding.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0 as u64
    }
}
