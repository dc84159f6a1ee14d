//! Compressed child blocks: a linear-probe hash table and a rank-ordered
//! array, both laid out inside Elias–Fano sequences.
//!
//! Neither structure stores its entries directly. Keys and node handles are
//! made non-decreasing with the prefix-sum trick (replace `a[i]` with
//! `a[0] + … + a[i]`) and handed to [`EfSequence`]. A lookup decodes slot
//! `i` as the difference of two adjacent accesses. Handles are shifted up by
//! [`MIN_ENCODABLE`] before summing so that arena index 0 stays encodable.
//!
//! [`EfHashMap`] is open-addressed at load factor 1.0: capacity equals the
//! entry count, the hash is `key mod n`, probing is linear with step 1.
//! Since gram IDs are already small dense integers, no mixing is needed.
//! [`EfSortedMap`] keeps its entries in the order given, descending node
//! frequency, so rank lookups are a single decode.

use std::cmp::Reverse;

use ef_sequence::{EfSequence, MIN_ENCODABLE};
use gram_core::{GramId, NodeRef};
use serde::{Deserialize, Serialize};

/// Running prefix sums of `values`, for Elias–Fano encoding.
fn prefix_sums(values: impl Iterator<Item = u64>) -> Vec<u64> {
    let mut acc = 0u64;
    values
        .map(|v| {
            acc += v;
            acc
        })
        .collect()
}

/// Recover the original value at `idx` from a prefix-summed sequence.
#[inline]
fn diff_at(seq: &EfSequence, idx: usize) -> u64 {
    if idx == 0 {
        seq.get(0)
    } else {
        seq.get(idx) - seq.get(idx - 1)
    }
}

#[inline]
fn decode_handle(seq: &EfSequence, idx: usize) -> NodeRef {
    NodeRef::from_usize((diff_at(seq, idx) - MIN_ENCODABLE) as usize)
}

/// Open-addressed hash table over `(GramId, NodeRef)` pairs, stored as two
/// prefix-summed Elias–Fano sequences.
///
/// Every slot is occupied (load factor 1.0), so a miss is only detected
/// after a full probe cycle. Keys must be distinct.
#[derive(Debug, Serialize, Deserialize)]
pub struct EfHashMap {
    keys: EfSequence,
    handles: EfSequence,
    len: usize,
}

impl EfHashMap {
    /// Build from key/handle pairs.
    ///
    /// # Panics
    /// Panics if `entries` is empty.
    pub fn new(entries: &[(GramId, NodeRef)]) -> Self {
        let n = entries.len();
        assert!(n > 0, "cannot build an empty hash block");

        let mut slots: Vec<Option<(GramId, NodeRef)>> = vec![None; n];
        for &(key, handle) in entries {
            let home = (key.as_u64() % n as u64) as usize;
            for j in 0..n {
                let idx = (home + j) % n;
                if slots[idx].is_none() {
                    slots[idx] = Some((key, handle));
                    break;
                }
            }
        }

        let filled: Vec<(GramId, NodeRef)> = slots
            .into_iter()
            .map(|s| s.expect("slot left empty despite full load"))
            .collect();
        let keys = prefix_sums(filled.iter().map(|&(key, _)| key.as_u64()));
        let handles = prefix_sums(filled.iter().map(|&(_, h)| h.as_u64() + MIN_ENCODABLE));

        EfHashMap {
            keys: EfSequence::new(&keys),
            handles: EfSequence::new(&handles),
            len: n,
        }
    }

    /// Look up the handle stored under `key`.
    pub fn get(&self, key: GramId) -> Option<NodeRef> {
        let home = (key.as_u64() % self.len as u64) as usize;
        for j in 0..self.len {
            let idx = (home + j) % self.len;
            if diff_at(&self.keys, idx) == key.as_u64() {
                return Some(decode_handle(&self.handles, idx));
            }
        }
        None
    }

    /// The handle with the `rank`-th highest frequency, per the supplied
    /// accessor. Decodes and sorts every slot; only used when a caller has
    /// exhausted a node's top-K block.
    pub fn get_rank(&self, rank: usize, frequency_of: impl Fn(NodeRef) -> u64) -> Option<NodeRef> {
        if rank >= self.len {
            return None;
        }
        let mut all: Vec<NodeRef> = self.handles().collect();
        all.sort_by_key(|&h| Reverse(frequency_of(h)));
        Some(all[rank])
    }

    /// Iterate over all stored handles in slot order.
    pub fn handles(&self) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.len).map(|i| decode_handle(&self.handles, i))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no entries. Always false once built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.keys.heap_bytes() + self.handles.heap_bytes()
    }
}

/// Fixed-order child array stored as two prefix-summed Elias–Fano
/// sequences. Entries keep the order they were given (callers supply them
/// sorted by descending frequency), so `get_rank` is a single decode.
///
/// ```
/// use ef_maps::EfSortedMap;
/// use gram_core::{GramId, NodeRef};
///
/// let block = EfSortedMap::new(&[
///     (GramId(9), NodeRef::from_usize(0)),
///     (GramId(4), NodeRef::from_usize(1)),
/// ]);
/// assert_eq!(block.get(GramId(4)), Some(NodeRef::from_usize(1)));
/// assert_eq!(block.get_rank(0), Some(NodeRef::from_usize(0)));
/// assert_eq!(block.get(GramId(5)), None);
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct EfSortedMap {
    keys: EfSequence,
    handles: EfSequence,
    len: usize,
}

impl EfSortedMap {
    /// Build from key/handle pairs, preserving their order.
    ///
    /// # Panics
    /// Panics if `entries` is empty.
    pub fn new(entries: &[(GramId, NodeRef)]) -> Self {
        assert!(!entries.is_empty(), "cannot build an empty sorted block");

        let keys = prefix_sums(entries.iter().map(|&(key, _)| key.as_u64()));
        let handles = prefix_sums(entries.iter().map(|&(_, h)| h.as_u64() + MIN_ENCODABLE));

        EfSortedMap {
            keys: EfSequence::new(&keys),
            handles: EfSequence::new(&handles),
            len: entries.len(),
        }
    }

    /// Look up the handle stored under `key` by linear scan. The block is
    /// at most K entries long, so the scan is short.
    pub fn get(&self, key: GramId) -> Option<NodeRef> {
        (0..self.len)
            .find(|&i| diff_at(&self.keys, i) == key.as_u64())
            .map(|i| decode_handle(&self.handles, i))
    }

    /// The handle at `rank` in the stored (frequency-descending) order.
    pub fn get_rank(&self, rank: usize) -> Option<NodeRef> {
        if rank >= self.len {
            return None;
        }
        Some(decode_handle(&self.handles, rank))
    }

    /// Iterate over all stored handles in rank order.
    pub fn handles(&self) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.len).map(|i| decode_handle(&self.handles, i))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no entries. Always false once built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.keys.heap_bytes() + self.handles.heap_bytes()
    }
}
