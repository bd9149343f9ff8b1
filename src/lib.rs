//! `rb_interval_set` is a set of disjoint integer intervals based on an interval tree.
//!
//! It fully implements the insertion and deletion functionality of a red-black tree,
//! ensuring that each modification operation requires at most O(logN) time complexity.
//! Every node is augmented with the largest high endpoint found in its subtree, which
//! lets overlap searches skip whole subtrees.
//!
//! Inserting an interval merges it with every stored interval it overlaps, so the set
//! always holds the minimal collection of disjoint intervals covering everything that
//! was inserted. Intervals are inclusive on both ends: [1, 5] and [5, 9] merge into
//! [1, 9], while [1, 5] and [6, 9] are kept apart.
//!
//! Nodes live in an array and refer to each other by index, with slot 0 acting as the
//! shared sentinel for every missing child and for the root's parent. Callers hold
//! generational [`NodeId`] handles to stored nodes and pass them back to
//! [`IntervalSet::delete`]; a handle whose node was deleted or merged away is detected
//! as stale instead of silently naming another node.
//!
//! # Example
//!
//! ```rust
//! use rb_interval_set::{Interval, IntervalSet};
//!
//! let mut set = IntervalSet::new();
//! set.insert(Interval::new(1, 5));
//! let id = set.insert(Interval::new(3, 8));
//! assert_eq!(set.get(id), Some(&Interval::new(1, 8)));
//! assert_eq!(set.sum_lengths(), 8);
//! assert!(set.interval_search(6).is_some());
//! assert!(set.interval_search(9).is_none());
//! ```
//!

mod error;
#[cfg(feature = "graphviz")]
mod graphviz;
mod index;
mod interval;
mod intervalset;
mod iter;
mod node;


pub use error::IntervalError;
pub use index::{DefaultIx, IndexType, NodeId};
pub use interval::Interval;
pub use intervalset::IntervalSet;
pub use iter::{IntoIter, Iter, OverlapIter};
