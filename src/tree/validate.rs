//! Filepath: src/tree/validate.rs
//!
//! Structural diagnostics: a full invariant check and the node-count
//! traversal behind [`BpTree::stats`].
//!
//! The checker is meant for tests and debugging — it visits every node
//! and every record. Nothing in the engine calls it on an operation
//! path.

use std::cmp::Ordering;
use std::fmt as StdFmt;

use crate::alloc::NodeAllocator;
use crate::compare::Comparator;
use crate::leaf::LeafNode;
use crate::node::Node;
use crate::tree::BpTree;

// ============================================================================
//  InvariantViolation
// ============================================================================

/// First structural defect found by [`BpTree::check_invariants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Keys within a node are not strictly increasing.
    UnsortedNode { depth: usize },

    /// A key escaped the interval its ancestors' separators allow.
    FenceKey { depth: usize },

    /// A node's key count is outside the permitted band.
    FillBound { depth: usize, len: usize },

    /// An internal node's child count is not `keys + 1`.
    ChildArity { keys: usize, children: usize },

    /// A leaf sits at the wrong depth.
    LeafDepth { expected: usize, found: usize },

    /// The sibling chain skips, repeats, or fails to terminate.
    BrokenChain,

    /// The stored record count disagrees with the leaves.
    CountMismatch { stored: usize, actual: usize },
}

impl StdFmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::UnsortedNode { depth } => {
                write!(f, "unsorted keys in node at depth {depth}")
            }

            Self::FenceKey { depth } => {
                write!(f, "key outside its fence interval at depth {depth}")
            }

            Self::FillBound { depth, len } => {
                write!(f, "key count {len} outside fill band at depth {depth}")
            }

            Self::ChildArity { keys, children } => {
                write!(f, "internal node with {keys} keys and {children} children")
            }

            Self::LeafDepth { expected, found } => {
                write!(f, "leaf at depth {found}, expected {expected}")
            }

            Self::BrokenChain => write!(f, "leaf sibling chain is broken"),

            Self::CountMismatch { stored, actual } => {
                write!(f, "stored count {stored}, leaves hold {actual}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

// ============================================================================
//  Checker
// ============================================================================

impl<K, V, C, A> BpTree<K, V, C, A>
where
    C: Comparator<K>,
    A: NodeAllocator<K, V>,
{
    /// Verify every structural invariant, reporting the first violation.
    ///
    /// With `require_min_fill` the fill floors are enforced for every
    /// non-root node: `min_keys` for leaves, `min_internal_keys` for
    /// internal nodes. Pass `false` for bulk-loaded trees, whose tail
    /// nodes may legitimately sit below the band until a delete touches
    /// them.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found, if any.
    pub fn check_invariants(&self, require_min_fill: bool) -> Result<(), InvariantViolation> {
        let mut walker = Walker {
            comparator: &self.comparator,
            order: self.order,
            min_leaf: if require_min_fill { self.min_keys } else { 1 },
            min_internal: if require_min_fill {
                self.min_internal_keys()
            } else {
                1
            },
            height: self.height,
            leaves: Vec::new(),
        };

        walker.walk(&*self.root, 1, None, None)?;
        walker.check_chain()?;

        let actual: usize = walker.leaves.iter().map(|leaf| leaf.len()).sum();
        if actual != self.count {
            return Err(InvariantViolation::CountMismatch {
                stored: self.count,
                actual,
            });
        }

        Ok(())
    }
}

struct Walker<'a, K, V, C> {
    comparator: &'a C,
    order: usize,
    min_leaf: usize,
    min_internal: usize,
    height: usize,
    /// Leaves in spine order, for the chain check.
    leaves: Vec<&'a LeafNode<K, V>>,
}

impl<'a, K, V, C> Walker<'a, K, V, C>
where
    C: Comparator<K>,
{
    fn walk(
        &mut self,
        node: &'a Node<K, V>,
        depth: usize,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
    ) -> Result<(), InvariantViolation> {
        let is_root = depth == 1;

        let keys: &[K] = match node {
            Node::Leaf(leaf) => &leaf.keys,

            Node::Internal(internal) => &internal.keys,
        };

        for pair in keys.windows(2) {
            if self.comparator.compare(&pair[0], &pair[1]) != Ordering::Less {
                return Err(InvariantViolation::UnsortedNode { depth });
            }
        }

        for key in keys {
            // A separator equals the first key of its right subtree, so
            // the lower fence is inclusive; the upper fence is strict.
            let below = lower
                .is_some_and(|bound| self.comparator.compare(key, bound) == Ordering::Less);
            let above = upper
                .is_some_and(|bound| self.comparator.compare(key, bound) != Ordering::Less);

            if below || above {
                return Err(InvariantViolation::FenceKey { depth });
            }
        }

        let len = keys.len();
        let floor = if is_root {
            // An empty tree is one empty root leaf; an internal root
            // needs a separator.
            usize::from(!node.is_leaf())
        } else if node.is_leaf() {
            self.min_leaf
        } else {
            self.min_internal
        };

        if len > self.order || len < floor {
            return Err(InvariantViolation::FillBound { depth, len });
        }

        match node {
            Node::Leaf(leaf) => {
                if depth != self.height {
                    return Err(InvariantViolation::LeafDepth {
                        expected: self.height,
                        found: depth,
                    });
                }

                self.leaves.push(leaf.as_ref());
                Ok(())
            }

            Node::Internal(internal) => {
                if internal.children.len() != len + 1 {
                    return Err(InvariantViolation::ChildArity {
                        keys: len,
                        children: internal.children.len(),
                    });
                }

                for (i, child) in internal.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
                    let child_upper = if i == len { upper } else { Some(&internal.keys[i]) };

                    self.walk(child, depth + 1, child_lower, child_upper)?;
                }

                Ok(())
            }
        }
    }

    /// The chain must visit the spine's leaves in spine order and end
    /// with the rightmost.
    fn check_chain(&self) -> Result<(), InvariantViolation> {
        for pair in self.leaves.windows(2) {
            let linked = pair[0]
                .next_leaf()
                .is_some_and(|ptr| std::ptr::eq(ptr.as_ptr(), pair[1] as *const LeafNode<K, V>));

            if !linked {
                return Err(InvariantViolation::BrokenChain);
            }
        }

        let terminated = self
            .leaves
            .last()
            .is_none_or(|last| last.next_leaf().is_none());

        if terminated {
            Ok(())
        } else {
            Err(InvariantViolation::BrokenChain)
        }
    }
}

// ============================================================================
//  Node count
// ============================================================================

/// Count every node in a subtree, leaves and internal alike.
pub(crate) fn node_count<K, V>(root: &Node<K, V>) -> usize {
    let mut total = 0;
    let mut worklist: Vec<&Node<K, V>> = vec![root];

    while let Some(node) = worklist.pop() {
        total += 1;

        if let Node::Internal(internal) = node {
            worklist.extend(internal.children.iter());
        }
    }

    total
}
