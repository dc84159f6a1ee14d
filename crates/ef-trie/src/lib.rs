//! Arena-based n-gram frequency trie with Elias–Fano compressed child sets.
//!
//! Nodes are stored in a contiguous arena (`Vec<TrieNode>`) and referenced
//! by opaque [`NodeRef`] handles, which are plain indices. Handles don't
//! borrow the arena, so they can be packed into the compressed child blocks
//! and decoded back without pointer gymnastics.
//!
//! Each node splits its children into two blocks: a `top_k` array holding
//! the K most frequent children in descending order ([`EfSortedMap`]), and
//! a `rest` hash block for the remainder ([`EfHashMap`]). The remainder
//! block is only created when more than K+1 children exist; a block of
//! length 1 cannot carry the hash layout, so a single straggler is folded
//! into `top_k` instead.
//!
//! The trie is built bottom-up in one streaming pass over records sorted
//! lexicographically by token sequence, holding one record of lookbehind:
//! whenever the shared prefix between consecutive records shrinks below a
//! depth, that depth's pending node is complete and is emitted with the
//! children accumulated beneath it. After the final record everything
//! still pending flushes, leaves first, root last.
//!
//! # Example
//!
//! ```
//! use ef_trie::{GramRecord, Trie};
//! use gram_core::GramId;
//!
//! // "the cat ran":3  "the cat sat":5  "the dog sat":2
//! // with the = 3, cat = 4, sat = 5, ran = 6, dog = 7.
//! let records = vec![
//!     GramRecord::new(vec![GramId(3), GramId(4), GramId(6)], 3),
//!     GramRecord::new(vec![GramId(3), GramId(4), GramId(5)], 5),
//!     GramRecord::new(vec![GramId(3), GramId(7), GramId(5)], 2),
//! ];
//! let trie = Trie::from_records(records, 3, 2);
//!
//! assert_eq!(trie.frequency_count(&[GramId(3), GramId(4)]), 8);
//! assert_eq!(trie.frequency_count(&[GramId(3)]), 10);
//! assert_eq!(
//!     trie.most_likely_next(&[GramId(3), GramId(4)], 2),
//!     vec![GramId(5), GramId(6)],
//! );
//! ```

use std::cmp::Reverse;

use ef_maps::{EfHashMap, EfSortedMap};
use gram_core::{GramId, NodeRef};
use serde::{Deserialize, Serialize};

/// One parsed corpus line: a fixed-length token-ID sequence and its count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GramRecord {
    /// Vocabulary IDs of the n-gram's tokens, in order.
    pub ids: Vec<GramId>,
    /// Occurrence count, always positive.
    pub count: u64,
}

impl GramRecord {
    /// Bundle a token-ID sequence with its count.
    pub fn new(ids: Vec<GramId>, count: u64) -> Self {
        GramRecord { ids, count }
    }
}

/// A single node: the gram reaching it, the total count of n-grams passing
/// through it, and its two compressed child blocks.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrieNode {
    gram: GramId,
    frequency: u64,
    top_k: Option<EfSortedMap>,
    rest: Option<EfHashMap>,
}

impl TrieNode {
    /// The gram ID this node represents.
    #[inline]
    pub fn gram(&self) -> GramId {
        self.gram
    }

    /// Total count of n-grams passing through this node. For an internal
    /// node this equals the sum of its children's frequencies.
    #[inline]
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.top_k.is_none()
    }

    /// Number of children across both blocks.
    pub fn child_count(&self) -> usize {
        self.top_k.as_ref().map_or(0, EfSortedMap::len)
            + self.rest.as_ref().map_or(0, EfHashMap::len)
    }

    /// The frequency-sorted top-K block, absent on leaves.
    #[inline]
    pub fn top_k(&self) -> Option<&EfSortedMap> {
        self.top_k.as_ref()
    }

    /// The hash-addressed remainder block, present only when the child
    /// count exceeds K+1.
    #[inline]
    pub fn rest(&self) -> Option<&EfHashMap> {
        self.rest.as_ref()
    }

    /// Approximate heap memory usage of the child blocks in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.top_k.as_ref().map_or(0, EfSortedMap::heap_bytes)
            + self.rest.as_ref().map_or(0, EfHashMap::heap_bytes)
    }
}

/// The n-gram trie: node arena, root hash block, and the top-K width.
///
/// Immutable once built; queries never mutate and may be shared freely
/// across readers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    /// Root child block; `None` for an empty corpus.
    roots: Option<EfHashMap>,
    k: usize,
    gram_len: usize,
}

impl Trie {
    /// Build from records sorted lexicographically by token sequence.
    ///
    /// Every record must carry exactly `gram_len` IDs. The build is a
    /// single pass: records stream through a one-element lookbehind and
    /// nodes are emitted bottom-up as prefixes complete.
    ///
    /// # Panics
    /// Panics if `gram_len < 2` or `k < 2`.
    pub fn from_records<I>(records: I, gram_len: usize, k: usize) -> Self
    where
        I: IntoIterator<Item = GramRecord>,
    {
        assert!(gram_len >= 2, "gram length must be at least 2, got {gram_len}");
        assert!(k >= 2, "top-k width must be at least 2, got {k}");

        let mut trie = Trie {
            nodes: Vec::new(),
            roots: None,
            k,
            gram_len,
        };

        // Pending children per depth, and pending aggregate counts for the
        // node forming at each depth above the leaves.
        let mut level_nodes: Vec<Vec<NodeRef>> = vec![Vec::new(); gram_len];
        let mut level_counts: Vec<u64> = vec![0; gram_len - 1];

        let mut prev: Option<GramRecord> = None;
        for record in records {
            debug_assert_eq!(record.ids.len(), gram_len);
            if let Some(prev_record) = prev.take() {
                let shared = shared_prefix(&prev_record.ids, &record.ids, gram_len - 1);
                trie.flush(&prev_record, shared, false, &mut level_nodes, &mut level_counts);
            }
            prev = Some(record);
        }

        if let Some(last_record) = prev {
            trie.flush(&last_record, 0, true, &mut level_nodes, &mut level_counts);
            let entries: Vec<(GramId, NodeRef)> = level_nodes[0]
                .iter()
                .map(|&r| (trie.nodes[r.as_usize()].gram, r))
                .collect();
            trie.roots = Some(EfHashMap::new(&entries));
        }

        trie
    }

    /// Emit every node `record` completes. A node at depth `d` is complete
    /// when the next record shares at most `d` leading tokens (its path
    /// through depth `d` has changed), or at end of input.
    fn flush(
        &mut self,
        record: &GramRecord,
        shared: usize,
        at_end: bool,
        level_nodes: &mut [Vec<NodeRef>],
        level_counts: &mut [u64],
    ) {
        let last = self.gram_len - 1;

        // The leaf always completes: sorted input never repeats a line.
        let leaf = self.push_node(record.ids[last], record.count, Vec::new());
        level_nodes[last].push(leaf);
        level_counts[last - 1] += record.count;

        // Deepest intermediate level first, so each emission can collect
        // the children the previous one produced.
        for depth in (1..last).rev() {
            if at_end || shared <= depth {
                let children = std::mem::take(&mut level_nodes[depth + 1]);
                let node = self.push_node(record.ids[depth], level_counts[depth], children);
                level_nodes[depth].push(node);
                level_counts[depth - 1] += level_counts[depth];
                level_counts[depth] = 0;
            }
        }

        if at_end || shared == 0 {
            let children = std::mem::take(&mut level_nodes[1]);
            let node = self.push_node(record.ids[0], level_counts[0], children);
            level_nodes[0].push(node);
            level_counts[0] = 0;
        }
    }

    /// Append a node to the arena, encoding its children into the top-K
    /// and remainder blocks.
    fn push_node(&mut self, gram: GramId, frequency: u64, mut children: Vec<NodeRef>) -> NodeRef {
        let (top_k, rest) = if children.is_empty() {
            (None, None)
        } else {
            children.sort_by_key(|&c| Reverse(self.nodes[c.as_usize()].frequency));
            let entries: Vec<(GramId, NodeRef)> = children
                .iter()
                .map(|&c| (self.nodes[c.as_usize()].gram, c))
                .collect();

            // A remainder of length 1 cannot carry the hash layout, so the
            // K+1-th child rides along in the sorted block.
            if self.k + 1 >= entries.len() {
                (Some(EfSortedMap::new(&entries)), None)
            } else {
                (
                    Some(EfSortedMap::new(&entries[..self.k])),
                    Some(EfHashMap::new(&entries[self.k..])),
                )
            }
        };

        let node_ref = NodeRef::from_usize(self.nodes.len());
        self.nodes.push(TrieNode {
            gram,
            frequency,
            top_k,
            rest,
        });
        node_ref
    }

    /// Access a node by reference.
    #[inline]
    pub fn node(&self, r: NodeRef) -> &TrieNode {
        &self.nodes[r.as_usize()]
    }

    /// Look up a root node by its gram ID.
    pub fn root(&self, gram: GramId) -> Option<NodeRef> {
        self.roots.as_ref()?.get(gram)
    }

    /// Find the child of `parent` matching `gram`: the top-K block first,
    /// then the remainder. `None` on a leaf or a double miss.
    pub fn find_successor(&self, parent: NodeRef, gram: GramId) -> Option<NodeRef> {
        let node = &self.nodes[parent.as_usize()];
        let top_k = node.top_k.as_ref()?;
        top_k
            .get(gram)
            .or_else(|| node.rest.as_ref().and_then(|rest| rest.get(gram)))
    }

    /// Walk the trie along `ids`. `None` if any step misses, including an
    /// empty slice.
    pub fn lookup(&self, ids: &[GramId]) -> Option<NodeRef> {
        let (&first, remainder) = ids.split_first()?;
        let mut current = self.root(first)?;
        for &id in remainder {
            current = self.find_successor(current, id)?;
        }
        Some(current)
    }

    /// Exact occurrence count of the n-gram prefix `ids`, 0 on any miss.
    pub fn frequency_count(&self, ids: &[GramId]) -> u64 {
        self.lookup(ids)
            .map_or(0, |r| self.nodes[r.as_usize()].frequency)
    }

    /// Up to `n` continuations of the prefix `ids`, most frequent first.
    /// Empty on any miss.
    pub fn most_likely_next(&self, ids: &[GramId], n: usize) -> Vec<GramId> {
        let Some(node_ref) = self.lookup(ids) else {
            return Vec::new();
        };
        self.successors_by_rank(node_ref, n)
            .iter()
            .map(|&r| self.nodes[r.as_usize()].gram)
            .collect()
    }

    /// Up to `n` children of `parent` by descending frequency: the top-K
    /// block in stored order, then remainder ranks as needed.
    pub fn successors_by_rank(&self, parent: NodeRef, n: usize) -> Vec<NodeRef> {
        let node = &self.nodes[parent.as_usize()];
        let Some(top_k) = node.top_k.as_ref() else {
            return Vec::new();
        };

        let total = top_k.len() + node.rest.as_ref().map_or(0, EfHashMap::len);
        let want = n.min(total);
        let mut out = Vec::with_capacity(want);

        let mut rank = 0;
        while out.len() < want && rank < top_k.len() {
            if let Some(child) = top_k.get_rank(rank) {
                out.push(child);
            }
            rank += 1;
        }

        if let Some(rest) = node.rest.as_ref() {
            let mut rank = 0;
            while out.len() < want {
                match rest.get_rank(rank, |h| self.nodes[h.as_usize()].frequency) {
                    Some(child) => out.push(child),
                    None => break,
                }
                rank += 1;
            }
        }

        out
    }

    /// All children of `parent`, top-K block first. Order within the
    /// remainder block is slot order, not frequency order.
    pub fn children(&self, parent: NodeRef) -> Vec<NodeRef> {
        let node = &self.nodes[parent.as_usize()];
        let mut out: Vec<NodeRef> = node
            .top_k
            .as_ref()
            .map_or_else(Vec::new, |t| t.handles().collect());
        if let Some(rest) = node.rest.as_ref() {
            out.extend(rest.handles());
        }
        out
    }

    /// Iterate over every node reference in the arena.
    pub fn node_refs(&self) -> impl Iterator<Item = NodeRef> {
        (0..self.nodes.len()).map(NodeRef::from_usize)
    }

    /// Total number of nodes in the trie.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the trie was built from an empty corpus.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The top-K width this trie was built with.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// The fixed gram length of the indexed corpus.
    #[inline]
    pub fn gram_len(&self) -> usize {
        self.gram_len
    }

    /// Approximate heap memory usage in bytes: the arena plus every child
    /// block, plus the root block.
    pub fn heap_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<TrieNode>()
            + self.nodes.iter().map(TrieNode::heap_bytes).sum::<usize>()
            + self.roots.as_ref().map_or(0, EfHashMap::heap_bytes)
    }
}

/// Length of the common prefix of `a` and `b`, capped at `upto`.
fn shared_prefix(a: &[GramId], b: &[GramId], upto: usize) -> usize {
    a.iter()
        .zip(b.iter())
        .take(upto)
        .take_while(|(x, y)| x == y)
        .count()
}
