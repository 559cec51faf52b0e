//! Shared test utilities: tracing setup and instrumented allocators.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ...
//! }
//! ```
//!
//! `RUST_LOG` filters the stream as usual (e.g. `bptree=debug`).

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

use bptree::internode::InternalNode;
use bptree::leaf::LeafNode;
use bptree::{AllocError, NodeAllocator};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test subscriber once per process. Safe to call from every
/// test; later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
//  CountingAllocator
// ============================================================================

/// Heap allocator that tallies allocations and releases through shared
/// counters, so a test can inspect the balance after the tree drops.
#[derive(Debug, Default, Clone)]
pub struct CountingAllocator {
    pub allocs: Rc<Cell<usize>>,
    pub releases: Rc<Cell<usize>>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.allocs.get() - self.releases.get()
    }
}

impl<K, V> NodeAllocator<K, V> for CountingAllocator {
    fn alloc_leaf(&mut self, order: usize) -> Result<Box<LeafNode<K, V>>, AllocError> {
        self.allocs.set(self.allocs.get() + 1);
        Ok(Box::new(LeafNode::new(order)))
    }

    fn alloc_internal(&mut self, order: usize) -> Result<Box<InternalNode<K, V>>, AllocError> {
        self.allocs.set(self.allocs.get() + 1);
        Ok(Box::new(InternalNode::new(order)))
    }

    fn dealloc_leaf(&mut self, leaf: Box<LeafNode<K, V>>) {
        self.releases.set(self.releases.get() + 1);
        drop(leaf);
    }

    fn dealloc_internal(&mut self, node: Box<InternalNode<K, V>>) {
        self.releases.set(self.releases.get() + 1);
        drop(node);
    }
}

// ============================================================================
//  FlakyAllocator
// ============================================================================

/// Allocator with a finite budget: every allocation past it fails.
/// Releases always succeed and are tallied like the counting allocator's.
#[derive(Debug, Clone)]
pub struct FlakyAllocator {
    pub budget: Rc<Cell<usize>>,
    pub allocs: Rc<Cell<usize>>,
    pub releases: Rc<Cell<usize>>,
}

impl FlakyAllocator {
    /// Allow exactly `budget` allocations before failing.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: Rc::new(Cell::new(budget)),
            allocs: Rc::new(Cell::new(0)),
            releases: Rc::new(Cell::new(0)),
        }
    }

    fn charge(&self) -> Result<(), AllocError> {
        let left = self.budget.get();
        if left == 0 {
            return Err(AllocError);
        }

        self.budget.set(left - 1);
        self.allocs.set(self.allocs.get() + 1);
        Ok(())
    }

    pub fn live(&self) -> usize {
        self.allocs.get() - self.releases.get()
    }
}

impl<K, V> NodeAllocator<K, V> for FlakyAllocator {
    fn alloc_leaf(&mut self, order: usize) -> Result<Box<LeafNode<K, V>>, AllocError> {
        self.charge()?;
        Ok(Box::new(LeafNode::new(order)))
    }

    fn alloc_internal(&mut self, order: usize) -> Result<Box<InternalNode<K, V>>, AllocError> {
        self.charge()?;
        Ok(Box::new(InternalNode::new(order)))
    }

    fn dealloc_leaf(&mut self, leaf: Box<LeafNode<K, V>>) {
        self.releases.set(self.releases.get() + 1);
        drop(leaf);
    }

    fn dealloc_internal(&mut self, node: Box<InternalNode<K, V>>) {
        self.releases.set(self.releases.get() + 1);
        drop(node);
    }
}
