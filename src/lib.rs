//! # bptree
//!
//! An in-memory B+ tree index: an ordered associative container with
//! point insert/lookup/delete, inclusive range scans, in-order
//! iteration, and bulk loading from presorted input.
//!
//! All records live in leaves; internal nodes hold only separator keys.
//! Leaves chain in key order, so scans and iteration walk siblings
//! instead of re-descending.
//!
//! ## Design
//!
//! - Branching factor (`order`, max keys per node) chosen at
//!   construction, clamped to at least 3.
//! - Key ordering and node memory are injected capabilities: a
//!   [`Comparator`] (defaulting to `Ord`) and a [`NodeAllocator`]
//!   (defaulting to the global heap).
//! - Single-owner: no operation blocks, suspends, or synchronizes.
//!   Iterators borrow the tree, so mutation during iteration is a
//!   compile error, not a runtime hazard.
//!
//! ## Example
//!
//! ```
//! use bptree::BpTree;
//!
//! let mut tree: BpTree<u32, &str> = BpTree::new(4);
//! for (k, v) in [(1, "one"), (2, "two"), (3, "three")] {
//!     tree.insert(k, v).unwrap();
//! }
//!
//! assert_eq!(tree.get(&2), Some(&"two"));
//! assert_eq!(tree.range(&1, &2), vec![&"one", &"two"]);
//! assert_eq!(tree.remove(&1), Ok("one"));
//! assert!(tree.get(&1).is_none());
//! ```

pub mod alloc;
pub mod compare;
pub mod internode;
pub mod ksearch;
pub mod leaf;
pub mod node;
pub mod tree;

mod trace;

pub use alloc::{AllocError, DefaultAllocator, NodeAllocator};
pub use compare::{Comparator, NaturalOrder};
pub use tree::{BpTree, InvariantViolation, Iter, MIN_ORDER, TreeError, TreeStats};
