//! An in-memory B+ tree index that keeps every value inserted under a key.
//!
//! [`BPTree`] maps an orderable key to a bucket of values. Inserting an existing key
//! appends to its bucket instead of replacing it, so the tree can index a dataset by
//! any field, including fields with repeated values.
//!
//! - [`get`](BPTree::get) - Logarithmic point lookup of the first value under a key
//! - [`range_search`](BPTree::range_search) - Every value whose key is `<=`, `==` or `>=` a query
//! - [`iter`](BPTree::iter) - Linear in-order traversal along the leaf chain
//!
//! # Example
//!
//! ```
//! use bptree_index::{BPTree, Comparator};
//!
//! let mut by_year = BPTree::new(3);
//! by_year.insert(1999, "The Matrix");
//! by_year.insert(1994, "Pulp Fiction");
//! by_year.insert(1999, "Fight Club");
//! by_year.insert(2001, "Spirited Away");
//!
//! assert_eq!(by_year.len(), 4);
//! assert_eq!(by_year.get(&1999), Some(&"The Matrix"));
//! assert_eq!(
//!     by_year.range_search(&1999, Comparator::AtLeast),
//!     [&"The Matrix", &"Fight Club", &"Spirited Away"]
//! );
//! ```
//!
//! # Implementation
//!
//! Nodes live in an arena owned by the tree and refer to each other by handle. Internal
//! nodes hold separator keys, each equal to the smallest key of the child to its right.
//! Leaves hold the keys and value buckets and form a doubly linked chain in key order.
//! A node splits as soon as it exceeds the branching factor, and the tree only grows in
//! height when the root itself splits.
//!
//! The tree has no deletion and no internal synchronization: mutation takes `&mut self`.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod raw;

pub mod bptree;
pub mod error;

pub use bptree::{BPTree, DEFAULT_BRANCHING_FACTOR, MIN_BRANCHING_FACTOR};
pub use comparator::Comparator;
pub use error::{Error, Result};
