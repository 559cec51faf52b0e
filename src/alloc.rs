//! Node allocation seam.
//!
//! This module defines [`NodeAllocator`], the trait the tree draws every
//! node from and returns every node to. The default implementation,
//! [`DefaultAllocator`], boxes nodes on the global heap and never fails;
//! instrumented allocators (accounting, fault injection) implement the
//! same trait in the test harness.
//!
//! # Design
//!
//! Static dispatch only — the allocator is a type parameter of the tree,
//! so the default costs nothing. Allocation is fallible ([`AllocError`]);
//! release is not. Release accepts exactly what allocation produced, one
//! node at a time.

use std::fmt as StdFmt;

use crate::internode::InternalNode;
use crate::leaf::LeafNode;

/// Allocation failure. Carries no payload; the failed operation reports
/// the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl StdFmt::Display for AllocError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "node allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// Source and sink for tree nodes.
///
/// `order` is the tree's maximum key count per node; implementations size
/// the node's internal arrays from it (see [`LeafNode::new`] and
/// [`InternalNode::new`] for the exact capacities).
///
/// # Contract
///
/// - A node passed to a `dealloc_*` hook was produced by the matching
///   `alloc_*` hook of the same allocator.
/// - `dealloc_*` must not fail; dropping the box is always acceptable.
pub trait NodeAllocator<K, V> {
    /// Allocate an empty leaf node sized for `order` keys.
    fn alloc_leaf(&mut self, order: usize) -> Result<Box<LeafNode<K, V>>, AllocError>;

    /// Allocate an empty internal node sized for `order` keys.
    fn alloc_internal(&mut self, order: usize) -> Result<Box<InternalNode<K, V>>, AllocError>;

    /// Release a leaf node.
    fn dealloc_leaf(&mut self, leaf: Box<LeafNode<K, V>>);

    /// Release an internal node.
    fn dealloc_internal(&mut self, node: Box<InternalNode<K, V>>);
}

/// Global-heap allocator. The default when the caller injects nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAllocator;

impl<K, V> NodeAllocator<K, V> for DefaultAllocator {
    #[inline]
    fn alloc_leaf(&mut self, order: usize) -> Result<Box<LeafNode<K, V>>, AllocError> {
        Ok(Box::new(LeafNode::new(order)))
    }

    #[inline]
    fn alloc_internal(&mut self, order: usize) -> Result<Box<InternalNode<K, V>>, AllocError> {
        Ok(Box::new(InternalNode::new(order)))
    }

    #[inline]
    fn dealloc_leaf(&mut self, leaf: Box<LeafNode<K, V>>) {
        drop(leaf);
    }

    #[inline]
    fn dealloc_internal(&mut self, node: Box<InternalNode<K, V>>) {
        drop(node);
    }
}
