//! Filepath: src/tree/bulk.rs
//!
//! Bulk load: build a tree from a presorted, duplicate-free sequence in
//! one bottom-up pass instead of n inserts.
//!
//! Phase 1 packs records into leaves of exactly `order` keys (the last
//! leaf takes the remainder) and wires the sibling chain. Phase 2 builds
//! internal levels: each node adopts up to `order + 1` children, with
//! the subtree-minimum key of every child after the first as its
//! separators; the minimum of the first child becomes the node's own
//! subtree minimum for the level above. Phase 3 stops when one node
//! remains — the root.
//!
//! A trailing group of one child would produce a key-less router, so it
//! borrows a child from its left neighbor instead.

use std::cmp::Ordering;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use crate::alloc::{DefaultAllocator, NodeAllocator};
use crate::compare::{Comparator, NaturalOrder};
use crate::leaf::LeafNode;
use crate::node::Node;
use crate::trace::debug_log;
use crate::tree::{BpTree, MIN_ORDER, TreeError, leaf_floor, release_subtree};

impl<K, V> BpTree<K, V>
where
    K: Ord + Clone,
{
    /// Bulk-load with the natural key order and the default allocator.
    /// See [`BpTree::bulk_load_with`].
    ///
    /// # Errors
    ///
    /// As for [`BpTree::bulk_load_with`].
    pub fn bulk_load(items: Vec<(K, V)>, order: usize) -> Result<Option<Self>, TreeError> {
        Self::bulk_load_with(items, order, NaturalOrder, DefaultAllocator, false)
    }
}

impl<K, V, C, A> BpTree<K, V, C, A>
where
    K: Clone,
    C: Comparator<K>,
    A: NodeAllocator<K, V>,
{
    /// Build a tree from records whose keys are strictly ascending under
    /// `comparator`. `O(n)` compares and moves.
    ///
    /// Returns `Ok(None)` for empty input: there is no tree to hand back.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidInput`] if the sequence is out of order or
    ///   contains duplicates.
    /// - [`TreeError::AllocationFailed`] if the allocator refuses a node;
    ///   every node built so far is released.
    pub fn bulk_load_with(
        items: Vec<(K, V)>,
        order: usize,
        comparator: C,
        mut allocator: A,
        debug: bool,
    ) -> Result<Option<Self>, TreeError> {
        let order = order.max(MIN_ORDER);

        if items.is_empty() {
            return Ok(None);
        }

        for pair in items.windows(2) {
            if comparator.compare(&pair[0].0, &pair[1].0) != Ordering::Less {
                return Err(TreeError::InvalidInput);
            }
        }

        let total = items.len();

        // Phase 1: pack leaves left to right.
        let mut leaves: Vec<Box<LeafNode<K, V>>> = Vec::with_capacity(total.div_ceil(order));

        for (key, value) in items {
            if leaves.last().is_none_or(|leaf| leaf.len() == order) {
                match allocator.alloc_leaf(order) {
                    Ok(leaf) => leaves.push(leaf),

                    Err(_) => {
                        debug_log!(debug, "allocation failure (bulk leaf)");
                        for leaf in leaves {
                            allocator.dealloc_leaf(leaf);
                        }
                        return Err(TreeError::AllocationFailed);
                    }
                }
            }

            let leaf = leaves.last_mut().expect("a leaf was just ensured");
            leaf.keys.push(key);
            leaf.values.push(value);
        }

        for i in 0..leaves.len().saturating_sub(1) {
            let next = NonNull::from(&mut *leaves[i + 1]);
            leaves[i].next = Some(next);
        }

        // Phase 2: build internal levels from (subtree-min, node) pairs.
        let mut height: usize = 1;
        let mut level: Vec<(K, Node<K, V>)> = leaves
            .into_iter()
            .map(|leaf| (leaf.keys[0].clone(), Node::Leaf(leaf)))
            .collect();

        while level.len() > 1 {
            let mut upper: Vec<(K, Node<K, V>)> = Vec::with_capacity(level.len() / (order + 1) + 1);
            let mut source = level.into_iter();
            let mut remaining = source.len();

            while remaining > 0 {
                let mut fanout = (order + 1).min(remaining);
                if remaining - fanout == 1 {
                    // Leave two children for the last group, not one.
                    fanout -= 1;
                }

                let mut node = match allocator.alloc_internal(order) {
                    Ok(node) => node,

                    Err(_) => {
                        debug_log!(debug, "allocation failure (bulk internal)");
                        for (_, built) in upper {
                            release_subtree(&mut allocator, built);
                        }
                        for (_, pending) in source {
                            release_subtree(&mut allocator, pending);
                        }
                        return Err(TreeError::AllocationFailed);
                    }
                };

                let (group_min, first_child) = source.next().expect("group is non-empty");
                node.children.push(first_child);

                for _ in 1..fanout {
                    let (sep, child) = source.next().expect("fanout never exceeds remaining");
                    node.keys.push(sep);
                    node.children.push(child);
                }

                remaining -= fanout;
                upper.push((group_min, Node::Internal(node)));
            }

            level = upper;
            height += 1;
        }

        let (_, root) = level.pop().expect("one node remains after level building");

        debug_log!(debug, count = total, height, "bulk load complete");

        Ok(Some(Self {
            order,
            min_keys: leaf_floor(order),
            height,
            count: total,
            comparator,
            allocator,
            debug,
            root: ManuallyDrop::new(root),
        }))
    }
}
