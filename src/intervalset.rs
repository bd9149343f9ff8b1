use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;

use crate::error::IntervalError;
use crate::index::{DefaultIx, IndexType, NodeId, NodeIndex};
use crate::interval::Interval;
use crate::iter::{IntoIter, Iter, OverlapIter};
use crate::node::{Color, Node};

/// Source of per-set tags stamped into every `NodeId`.
static NEXT_SET_TAG: AtomicU32 = AtomicU32::new(0);

/// A set of disjoint integer intervals, stored in an augmented red-black tree.
///
/// Inserting an interval merges it with every stored interval it overlaps, so the
/// set always holds the minimal disjoint cover of everything inserted so far.
#[derive(Debug)]
pub struct IntervalSet<Ix = DefaultIx> {
    /// Arena of nodes, slot 0 is the sentinel
    pub(crate) nodes: Vec<Node<Ix>>,
    /// Freed slots ready for reuse
    pub(crate) free: Vec<NodeIndex<Ix>>,
    /// Root of the interval tree
    pub(crate) root: NodeIndex<Ix>,
    /// Number of intervals in the set
    pub(crate) len: usize,
    /// Tag shared by every handle this set hands out
    pub(crate) tag: u32,
}

impl<Ix> IntervalSet<Ix>
where
    Ix: IndexType,
{
    /// Creates a new `IntervalSet` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = vec![Node::new_sentinel()];
        nodes.reserve(capacity);
        IntervalSet {
            nodes,
            free: Vec::new(),
            root: NodeIndex::sentinel(),
            len: 0,
            tag: NEXT_SET_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Insert an interval, merging it with every stored interval it overlaps.
    ///
    /// Returns the handle of the stored node, whose interval is the union of
    /// `interval` and everything it was merged with. Handles of merged nodes
    /// become stale.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// let a = set.insert(Interval::new(1, 5));
    /// let b = set.insert(Interval::new(3, 8));
    /// assert!(!set.is_alive(a));
    /// assert_eq!(set.get(b), Some(&Interval::new(1, 8)));
    /// set.insert(Interval::new(10, 12));
    /// assert_eq!(set.len(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, interval: Interval) -> NodeId<Ix> {
        let mut merged = interval;
        while let Some(x) = self.search(&merged) {
            let found = self.remove_node(x);
            trace!("merging {} into {}", found, merged);
            merged = merged.merge(&found);
        }
        let z = self.alloc(merged);
        self.insert_inner(z);
        self.node_id(z)
    }

    /// Validate `low <= high` and insert the interval [low, high].
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::InvalidRange`] when low > high; the set is left unchanged.
    #[inline]
    pub fn insert_range(&mut self, low: i64, high: i64) -> Result<NodeId<Ix>, IntervalError> {
        let interval = Interval::try_new(low, high)?;
        Ok(self.insert(interval))
    }

    /// Remove the node named by `id`, returning its interval.
    ///
    /// # Panics
    ///
    /// This method panics when `id` is stale: its node was already deleted, merged
    /// away, or cleared.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// let id = set.insert(Interval::new(3, 6));
    /// set.insert(Interval::new(10, 15));
    /// assert_eq!(set.delete(id), Interval::new(3, 6));
    /// assert_eq!(set.len(), 1);
    /// assert!(!set.contains(4));
    /// ```
    #[inline]
    pub fn delete(&mut self, id: NodeId<Ix>) -> Interval {
        assert!(self.is_alive(id), "stale node handle");
        self.remove_node(id.index)
    }

    /// Remove the node named by `id` if the handle is still live.
    #[inline]
    pub fn try_delete(&mut self, id: NodeId<Ix>) -> Option<Interval> {
        self.is_alive(id).then(|| self.remove_node(id.index))
    }

    /// Find a stored interval that overlaps with the given interval.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(1, 3));
    /// set.insert(Interval::new(6, 7));
    /// let id = set.find_overlapping(&Interval::new(5, 6)).unwrap();
    /// assert_eq!(set.get(id), Some(&Interval::new(6, 7)));
    /// assert!(set.find_overlapping(&Interval::new(4, 5)).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn find_overlapping(&self, query: &Interval) -> Option<NodeId<Ix>> {
        self.search(query).map(|x| self.node_id(x))
    }

    /// Find the stored interval containing `point`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(3, 6));
    /// set.insert(Interval::new(10, 15));
    /// assert!(set.interval_search(10).is_some());
    /// assert!(set.interval_search(7).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn interval_search(&self, point: i64) -> Option<NodeId<Ix>> {
        self.find_overlapping(&Interval::point(point))
    }

    /// Check if any stored interval contains `point`.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: i64) -> bool {
        self.search(&Interval::point(point)).is_some()
    }

    /// Total number of integers covered by the set.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(1, 5));
    /// set.insert(Interval::new(3, 8));
    /// set.insert(Interval::new(20, 20));
    /// assert_eq!(set.sum_lengths(), 9);
    /// ```
    #[inline]
    #[must_use]
    pub fn sum_lengths(&self) -> u128 {
        self.sum_lengths_inner(self.root)
    }

    /// Return the interval at the root of the tree without removing it.
    ///
    /// Which interval sits at the root is unspecified; use this to pick "some
    /// remaining interval".
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&Interval> {
        self.node_ref(self.root, |n| n.interval.as_ref())
    }

    /// Remove a single covered value from the set.
    ///
    /// The interval containing `point` is split around it and the remainders are
    /// stored back. Returns `false` when `point` was not covered.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(5, 10));
    /// assert!(set.remove_point(7));
    /// assert!(!set.remove_point(7));
    /// let stored: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(stored, vec![Interval::new(5, 6), Interval::new(8, 10)]);
    /// ```
    #[inline]
    pub fn remove_point(&mut self, point: i64) -> bool {
        let Some(x) = self.search(&Interval::point(point)) else {
            return false;
        };
        let interval = self.remove_node(x);
        let (left, right) = interval
            .split_at(point)
            .unwrap_or_else(|err| panic!("search returned a non-covering node: {err}"));
        trace!("split {} at {}", interval, point);
        for piece in left.into_iter().chain(right) {
            let _ignore = self.insert(piece);
        }
        true
    }

    /// Consume one covered value: the low endpoint of the interval returned by
    /// [`peek`](Self::peek).
    ///
    /// Calling this until it returns `None` yields exactly
    /// [`sum_lengths`](Self::sum_lengths) values, each of them once.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(1, 3));
    /// set.insert(Interval::new(7, 7));
    /// let mut values: Vec<_> = std::iter::from_fn(|| set.pop_value()).collect();
    /// values.sort_unstable();
    /// assert_eq!(values, vec![1, 2, 3, 7]);
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    pub fn pop_value(&mut self) -> Option<i64> {
        let value = self.peek()?.low();
        let removed = self.remove_point(value);
        debug_assert!(removed, "peeked value must be covered");
        Some(value)
    }

    /// Return the interval named by `id`, or `None` if the handle is stale.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId<Ix>) -> Option<&Interval> {
        if self.is_alive(id) {
            self.node_ref(id.index, |n| n.interval.as_ref())
        } else {
            None
        }
    }

    /// Check if `id` still names a stored node of this set.
    ///
    /// Handles handed out by another set are never alive here.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: NodeId<Ix>) -> bool {
        id.tag == self.tag
            && id.index != NodeIndex::sentinel()
            && self
                .nodes
                .get(id.index.index())
                .is_some_and(|n| !n.is_vacant() && n.generation == id.generation)
    }

    /// The node with the smallest interval in the subtree rooted at `id`.
    ///
    /// # Panics
    ///
    /// This method panics when `id` is stale.
    #[inline]
    #[must_use]
    pub fn minimum(&self, id: NodeId<Ix>) -> NodeId<Ix> {
        assert!(self.is_alive(id), "stale node handle");
        self.node_id(self.tree_minimum(id.index))
    }

    /// The node holding the next interval in sorted order.
    ///
    /// # Panics
    ///
    /// This method panics when `id` is stale.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(10, 12));
    /// set.insert(Interval::new(1, 3));
    /// let first = set.first().unwrap();
    /// let next = set.successor(first).unwrap();
    /// assert_eq!(set.get(next), Some(&Interval::new(10, 12)));
    /// assert!(set.successor(next).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn successor(&self, id: NodeId<Ix>) -> Option<NodeId<Ix>> {
        assert!(self.is_alive(id), "stale node handle");
        let y = self.tree_successor(id.index);
        (!self.is_sentinel(y)).then(|| self.node_id(y))
    }

    /// The node holding the smallest interval.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<NodeId<Ix>> {
        (!self.is_sentinel(self.root)).then(|| self.node_id(self.tree_minimum(self.root)))
    }

    /// The node holding the largest interval.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<NodeId<Ix>> {
        (!self.is_sentinel(self.root)).then(|| self.node_id(self.tree_maximum(self.root)))
    }

    /// Get an iterator over the stored intervals, sorted by low endpoint.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, Ix> {
        Iter::new(self)
    }

    /// Get an iterator over the stored intervals overlapping `query`, sorted.
    ///
    /// Equal to `iter().filter(|i| i.overlap(&query))` but skips subtrees that
    /// cannot match.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(1, 3));
    /// set.insert(Interval::new(6, 7));
    /// set.insert(Interval::new(9, 11));
    /// let found: Vec<_> = set.overlapping(Interval::new(3, 9)).copied().collect();
    /// assert_eq!(found.len(), 3);
    /// let found: Vec<_> = set.overlapping(Interval::new(4, 5)).collect();
    /// assert!(found.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn overlapping(&self, query: Interval) -> OverlapIter<'_, Ix> {
        OverlapIter::new(self, query)
    }

    /// Remove all intervals. Every outstanding handle becomes stale.
    #[inline]
    pub fn clear(&mut self) {
        for node in self.nodes.iter_mut().skip(1) {
            if !node.is_vacant() {
                let _ignore = node.vacate();
            }
        }
        self.free = (1..self.nodes.len())
            .rev()
            .filter(|i| !self.nodes[*i].is_retired())
            .map(NodeIndex::new)
            .collect();
        self.root = NodeIndex::sentinel();
        self.nodes[0] = Node::new_sentinel();
        self.len = 0;
    }

    /// Return the number of disjoint intervals in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the set contains no intervals.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntervalSet {
    /// Create an empty `IntervalSet`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }
}

impl<Ix> Default for IntervalSet<Ix>
where
    Ix: IndexType,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<Ix> FromIterator<Interval> for IntervalSet<Ix>
where
    Ix: IndexType,
{
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<Ix> Extend<Interval> for IntervalSet<Ix>
where
    Ix: IndexType,
{
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for interval in iter {
            let _ignore = self.insert(interval);
        }
    }
}

impl<'a, Ix> IntoIterator for &'a IntervalSet<Ix>
where
    Ix: IndexType,
{
    type Item = &'a Interval;
    type IntoIter = Iter<'a, Ix>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<Ix> IntoIterator for IntervalSet<Ix>
where
    Ix: IndexType,
{
    type Item = Interval;
    type IntoIter = IntoIter<Ix>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

#[cfg(feature = "serde")]
impl<Ix> serde::Serialize for IntervalSet<Ix>
where
    Ix: IndexType,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, Ix> serde::Deserialize<'de> for IntervalSet<Ix>
where
    Ix: IndexType,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let intervals = <Vec<Interval> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(intervals.into_iter().collect())
    }
}

impl<Ix> IntervalSet<Ix>
where
    Ix: IndexType,
{
    /// Take a slot for a new red leaf, reusing freed slots first.
    fn alloc(&mut self, interval: Interval) -> NodeIndex<Ix> {
        if let Some(idx) = self.free.pop() {
            let generation = self.node_ref(idx, |n| n.generation);
            self.nodes[idx.index()] = Node::new_leaf(interval, generation);
            return idx;
        }
        let idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node::new_leaf(interval, 0));
        idx
    }

    /// Unlink a live node, free its slot and return its interval.
    fn remove_node(&mut self, z: NodeIndex<Ix>) -> Interval {
        self.remove_inner(z);
        let interval = self.node_mut(z, Node::vacate);
        if !self.node_ref(z, Node::is_retired) {
            self.free.push(z);
        }
        trace!("removed {}", interval);
        interval
    }

    fn node_id(&self, x: NodeIndex<Ix>) -> NodeId<Ix> {
        NodeId::new(x, self.node_ref(x, |n| n.generation), self.tag)
    }

    /// Insert a node into the tree.
    fn insert_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y = NodeIndex::sentinel();
        let mut x = self.root;
        let low = self.node_ref(z, Node::interval).low;

        while !self.is_sentinel(x) {
            y = x;
            if low < self.node_ref(x, Node::interval).low {
                x = self.node_ref(x, Node::left);
            } else {
                x = self.node_ref(x, Node::right);
            }
        }
        self.node_mut(z, Node::set_parent(y));
        if self.is_sentinel(y) {
            self.root = z;
        } else {
            if low < self.node_ref(y, Node::interval).low {
                self.node_mut(y, Node::set_left(z));
            } else {
                self.node_mut(y, Node::set_right(z));
            }
            self.update_max_bottom_up(y);
        }
        self.node_mut(z, Node::set_color(Color::Red));

        self.insert_fixup(z);

        self.len = self.len.wrapping_add(1);
    }

    /// Remove a node from the tree.
    fn remove_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y = z;
        let mut y_orig_color = self.node_ref(y, Node::color);
        let x;
        if self.is_sentinel(self.node_ref(z, Node::left)) {
            x = self.node_ref(z, Node::right);
            self.transplant(z, x);
            self.update_max_bottom_up(self.node_ref(z, Node::parent));
        } else if self.is_sentinel(self.node_ref(z, Node::right)) {
            x = self.node_ref(z, Node::left);
            self.transplant(z, x);
            self.update_max_bottom_up(self.node_ref(z, Node::parent));
        } else {
            y = self.tree_minimum(self.node_ref(z, Node::right));
            let mut p = y;
            y_orig_color = self.node_ref(y, Node::color);
            x = self.node_ref(y, Node::right);
            if self.node_ref(y, Node::parent) == z {
                self.node_mut(x, Node::set_parent(y));
            } else {
                self.transplant(y, x);
                p = self.node_ref(y, Node::parent);
                self.node_mut(y, Node::set_right(self.node_ref(z, Node::right)));
                self.right_mut(y, Node::set_parent(y));
            }
            self.transplant(z, y);
            self.node_mut(y, Node::set_left(self.node_ref(z, Node::left)));
            self.left_mut(y, Node::set_parent(y));
            self.node_mut(y, Node::set_color(self.node_ref(z, Node::color)));

            self.update_max_bottom_up(p);
        }

        if matches!(y_orig_color, Color::Black) {
            self.remove_fixup(x);
        }

        self.len = self.len.wrapping_sub(1);
    }

    /// Search for an interval that overlaps with the given interval.
    fn search(&self, query: &Interval) -> Option<NodeIndex<Ix>> {
        let mut x = self.root;
        while !self.is_sentinel(x) {
            if self.node_ref(x, Node::interval).overlap(query) {
                return Some(x);
            }
            let left = self.node_ref(x, Node::left);
            if !self.is_sentinel(left) && self.node_ref(left, Node::max) >= query.low {
                x = left;
            } else {
                x = self.node_ref(x, Node::right);
            }
        }
        None
    }

    fn sum_lengths_inner(&self, x: NodeIndex<Ix>) -> u128 {
        if self.is_sentinel(x) {
            return 0;
        }
        self.node_ref(x, Node::interval).len()
            + self.sum_lengths_inner(self.node_ref(x, Node::left))
            + self.sum_lengths_inner(self.node_ref(x, Node::right))
    }

    /// Restore red-black tree properties after an insert.
    fn insert_fixup(&mut self, mut z: NodeIndex<Ix>) {
        while self.parent_ref(z, Node::is_red) && self.node_ref(z, Node::parent) != self.root {
            let p = self.node_ref(z, Node::parent);
            let g = self.node_ref(p, Node::parent);
            if self.is_left_child(p) {
                let u = self.node_ref(g, Node::right);
                if self.node_ref(u, Node::is_red) {
                    self.bubble(p, u, g);
                    z = g;
                } else {
                    if self.is_right_child(z) {
                        z = p;
                        self.left_rotate(z);
                    }
                    let p = self.node_ref(z, Node::parent);
                    let g = self.node_ref(p, Node::parent);
                    self.swap_colors(p, g);
                    self.right_rotate(g);
                }
            } else {
                let u = self.node_ref(g, Node::left);
                if self.node_ref(u, Node::is_red) {
                    self.bubble(p, u, g);
                    z = g;
                } else {
                    if self.is_left_child(z) {
                        z = p;
                        self.right_rotate(z);
                    }
                    let p = self.node_ref(z, Node::parent);
                    let g = self.node_ref(p, Node::parent);
                    self.swap_colors(p, g);
                    self.left_rotate(g);
                }
            }
        }
        self.node_mut(self.root, Node::set_color(Color::Black));
    }

    /// Push the grandparent's blackness down onto the red parent and uncle.
    fn bubble(&mut self, p: NodeIndex<Ix>, u: NodeIndex<Ix>, g: NodeIndex<Ix>) {
        assert!(
            self.node_ref(p, Node::is_red)
                && self.node_ref(u, Node::is_red)
                && self.node_ref(g, Node::is_black),
            "bubble needs a red parent, a red uncle and a black grandparent"
        );
        self.node_mut(p, Node::set_color(Color::Black));
        self.node_mut(u, Node::set_color(Color::Black));
        self.node_mut(g, Node::set_color(Color::Red));
    }

    fn swap_colors(&mut self, a: NodeIndex<Ix>, b: NodeIndex<Ix>) {
        let a_color = self.node_ref(a, Node::color);
        let b_color = self.node_ref(b, Node::color);
        assert_ne!(a_color, b_color, "color swap needs one red and one black node");
        self.node_mut(a, Node::set_color(b_color));
        self.node_mut(b, Node::set_color(a_color));
    }

    /// Restore red-black tree properties after a remove.
    fn remove_fixup(&mut self, mut x: NodeIndex<Ix>) {
        while x != self.root && self.node_ref(x, Node::is_black) {
            let mut w;
            if self.is_left_child(x) {
                w = self.parent_ref(x, Node::right);
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::right);
                }
                assert!(!self.is_sentinel(w), "black-height deficit without a sibling");
                if self.left_ref(w, Node::is_black) && self.right_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.right_ref(w, Node::is_black) {
                        self.left_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.right_rotate(w);
                        w = self.parent_ref(x, Node::right);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.right_mut(w, Node::set_color(Color::Black));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            } else {
                w = self.parent_ref(x, Node::left);
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::left);
                }
                assert!(!self.is_sentinel(w), "black-height deficit without a sibling");
                if self.right_ref(w, Node::is_black) && self.left_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.left_ref(w, Node::is_black) {
                        self.right_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.left_rotate(w);
                        w = self.parent_ref(x, Node::left);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.left_mut(w, Node::set_color(Color::Black));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            }
        }
        self.node_mut(x, Node::set_color(Color::Black));
    }

    /// Binary tree left rotate.
    fn left_rotate(&mut self, x: NodeIndex<Ix>) {
        let y = self.node_ref(x, Node::right);
        assert!(!self.is_sentinel(y), "left rotate needs a right child");
        self.node_mut(x, Node::set_right(self.node_ref(y, Node::left)));
        if !self.is_sentinel(self.node_ref(y, Node::left)) {
            self.left_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_left(x));

        self.recalculate_max(x);
        self.recalculate_max(y);
    }

    /// Binary tree right rotate.
    fn right_rotate(&mut self, x: NodeIndex<Ix>) {
        let y = self.node_ref(x, Node::left);
        assert!(!self.is_sentinel(y), "right rotate needs a left child");
        self.node_mut(x, Node::set_left(self.node_ref(y, Node::right)));
        if !self.is_sentinel(self.node_ref(y, Node::right)) {
            self.right_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_right(x));

        self.recalculate_max(x);
        self.recalculate_max(y);
    }

    /// Replace parent during a rotation.
    fn replace_parent(&mut self, x: NodeIndex<Ix>, y: NodeIndex<Ix>) {
        self.node_mut(y, Node::set_parent(self.node_ref(x, Node::parent)));
        if self.is_sentinel(self.node_ref(x, Node::parent)) {
            self.root = y;
        } else if self.is_left_child(x) {
            self.parent_mut(x, Node::set_left(y));
        } else {
            self.parent_mut(x, Node::set_right(y));
        }
        self.node_mut(x, Node::set_parent(y));
    }

    /// Update the max value towards the root
    fn update_max_bottom_up(&mut self, x: NodeIndex<Ix>) {
        let mut p = x;
        while !self.is_sentinel(p) {
            self.recalculate_max(p);
            p = self.node_ref(p, Node::parent);
        }
    }

    /// Recalculate max value from the node's own interval and both children
    fn recalculate_max(&mut self, x: NodeIndex<Ix>) {
        let max = self
            .node_ref(x, Node::interval)
            .high
            .max(self.left_ref(x, Node::max))
            .max(self.right_ref(x, Node::max));
        self.node_mut(x, Node::set_max(max));
    }

    /// Find the node with the minimum interval.
    fn tree_minimum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while !self.is_sentinel(self.node_ref(x, Node::left)) {
            x = self.node_ref(x, Node::left);
        }
        x
    }

    /// Find the node with the maximum interval.
    fn tree_maximum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while !self.is_sentinel(self.node_ref(x, Node::right)) {
            x = self.node_ref(x, Node::right);
        }
        x
    }

    /// Find the in-order successor, the sentinel if `x` is the last node.
    fn tree_successor(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        let right = self.node_ref(x, Node::right);
        if !self.is_sentinel(right) {
            return self.tree_minimum(right);
        }
        let mut y = self.node_ref(x, Node::parent);
        while !self.is_sentinel(y) && x == self.node_ref(y, Node::right) {
            x = y;
            y = self.node_ref(y, Node::parent);
        }
        y
    }

    /// Replace one subtree as a child of its parent with another subtree.
    fn transplant(&mut self, u: NodeIndex<Ix>, v: NodeIndex<Ix>) {
        if self.is_sentinel(self.node_ref(u, Node::parent)) {
            self.root = v;
        } else if self.is_left_child(u) {
            self.parent_mut(u, Node::set_left(v));
        } else {
            self.parent_mut(u, Node::set_right(v));
        }
        self.node_mut(v, Node::set_parent(self.node_ref(u, Node::parent)));
    }

    /// Check if a node is a left child of its parent.
    fn is_left_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::left) == node
    }

    /// Check if a node is a right child of its parent.
    fn is_right_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::right) == node
    }
}

// Convenient methods for reference or mutate current/parent/left/right node
impl<'a, Ix> IntervalSet<Ix>
where
    Ix: IndexType,
{
    pub(crate) fn is_sentinel(&self, node: NodeIndex<Ix>) -> bool {
        node == NodeIndex::sentinel()
    }

    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    fn left_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&self.nodes[idx])
    }

    fn right_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&self.nodes[idx])
    }

    fn parent_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&self.nodes[idx])
    }

    fn left_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&mut self.nodes[idx])
    }

    fn right_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&mut self.nodes[idx])
    }

    fn parent_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&mut self.nodes[idx])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stored(set: &IntervalSet) -> Vec<(i64, i64)> {
        set.iter().map(|i| (i.low(), i.high())).collect()
    }

    #[test]
    fn overlapping_inserts_merge() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(1, 5));
        set.insert(Interval::new(3, 8));
        assert_eq!(stored(&set), vec![(1, 8)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn disjoint_inserts_stay_apart() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(1, 3));
        set.insert(Interval::new(10, 12));
        assert_eq!(stored(&set), vec![(1, 3), (10, 12)]);
    }

    #[test]
    fn touching_inserts_stay_apart() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(1, 5));
        set.insert(Interval::new(6, 10));
        assert_eq!(stored(&set), vec![(1, 5), (6, 10)]);
        assert_eq!(set.sum_lengths(), 10);
    }

    #[test]
    fn bridging_insert_merges_many() {
        let mut set = IntervalSet::new();
        let a = set.insert(Interval::new(1, 2));
        let b = set.insert(Interval::new(4, 5));
        let c = set.insert(Interval::new(7, 8));
        let d = set.insert(Interval::new(20, 30));
        let merged = set.insert(Interval::new(2, 7));
        assert_eq!(stored(&set), vec![(1, 8), (20, 30)]);
        assert!(![a, b, c].iter().any(|id| set.is_alive(*id)));
        assert!(set.is_alive(d));
        assert_eq!(set.get(merged), Some(&Interval::new(1, 8)));
    }

    #[test]
    fn contained_insert_keeps_outer_bounds() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(0, 100));
        let id = set.insert(Interval::new(40, 50));
        assert_eq!(set.get(id), Some(&Interval::new(0, 100)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn interval_search_examples() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(3, 6));
        set.insert(Interval::new(10, 15));
        assert!(set.interval_search(10).is_some());
        assert!(set.interval_search(15).is_some());
        assert!(set.interval_search(3).is_some());
        assert!(set.interval_search(7).is_none());
        assert!(set.interval_search(2).is_none());
        assert!(set.interval_search(16).is_none());
    }

    #[test]
    fn search_handles_extreme_endpoints() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(i64::MIN, i64::MIN + 2));
        set.insert(Interval::new(0, 0));
        set.insert(Interval::new(i64::MAX - 1, i64::MAX));
        assert!(set.contains(i64::MIN));
        assert!(set.contains(i64::MAX));
        assert!(!set.contains(i64::MIN + 3));
        assert_eq!(set.sum_lengths(), 6);
        assert!(set
            .find_overlapping(&Interval::new(i64::MIN, i64::MAX))
            .is_some());
    }

    #[test]
    fn empty_set_queries_are_absent() {
        let set = IntervalSet::new();
        assert!(set.peek().is_none());
        assert!(set.find_overlapping(&Interval::new(0, 10)).is_none());
        assert!(set.interval_search(0).is_none());
        assert!(set.first().is_none());
        assert!(set.last().is_none());
        assert_eq!(set.sum_lengths(), 0);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn peek_returns_root_interval() {
        let mut set = IntervalSet::new();
        for low in [10, 20, 30] {
            set.insert(Interval::new(low, low + 1));
        }
        // ascending inserts rotate the middle interval to the root
        assert_eq!(set.peek(), Some(&Interval::new(20, 21)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn insert_range_rejects_reversed_bounds() {
        let mut set = IntervalSet::new();
        assert_eq!(
            set.insert_range(5, 1),
            Err(IntervalError::InvalidRange { low: 5, high: 1 })
        );
        assert!(set.is_empty());
        let id = set.insert_range(1, 5).unwrap();
        assert_eq!(set.get(id), Some(&Interval::new(1, 5)));
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn delete_twice_should_panic() {
        let mut set = IntervalSet::new();
        let id = set.insert(Interval::new(1, 2));
        set.delete(id);
        set.delete(id);
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn delete_merged_handle_should_panic() {
        let mut set = IntervalSet::new();
        let id = set.insert(Interval::new(1, 2));
        set.insert(Interval::new(2, 3));
        set.delete(id);
    }

    #[test]
    fn reused_slot_does_not_revive_handle() {
        let mut set = IntervalSet::new();
        let old = set.insert(Interval::new(1, 2));
        assert_eq!(set.try_delete(old), Some(Interval::new(1, 2)));
        let new = set.insert(Interval::new(50, 60));
        assert_eq!(old.index, new.index);
        assert!(!set.is_alive(old));
        assert!(set.get(old).is_none());
        assert_eq!(set.try_delete(old), None);
        assert_eq!(set.get(new), Some(&Interval::new(50, 60)));
    }

    #[test]
    fn handle_from_another_set_is_not_alive() {
        let mut a = IntervalSet::new();
        let mut b = IntervalSet::new();
        let id_a = a.insert(Interval::new(1, 2));
        let id_b = b.insert(Interval::new(10, 20));
        assert_eq!(id_a.index, id_b.index);
        assert_eq!(id_a.generation, id_b.generation);
        assert!(!b.is_alive(id_a));
        assert!(b.get(id_a).is_none());
        assert_eq!(b.try_delete(id_a), None);
        assert_eq!(b.len(), 1);
        assert!(b.is_alive(id_b));
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn delete_with_foreign_handle_should_panic() {
        let mut a = IntervalSet::new();
        let mut b = IntervalSet::new();
        let id = a.insert(Interval::new(1, 2));
        b.insert(Interval::new(10, 20));
        b.delete(id);
    }

    #[test]
    fn exhausted_slot_is_retired() {
        let mut set = IntervalSet::new();
        let old = set.insert(Interval::new(1, 2));
        set.nodes[old.index.index()].generation = u32::MAX - 1;
        let old = set.node_id(old.index);
        assert_eq!(set.delete(old), Interval::new(1, 2));
        assert!(set.free.is_empty());

        let new = set.insert(Interval::new(1, 2));
        assert_ne!(old.index, new.index);
        assert!(!set.is_alive(old));
        assert!(set.is_alive(new));

        set.clear();
        assert_eq!(set.free, vec![new.index]);
        let again = set.insert(Interval::new(5, 6));
        assert_eq!(again.index, new.index);
        assert!(!set.is_alive(old));
    }

    #[test]
    fn sorted_traversal_with_successor() {
        let mut set = IntervalSet::new();
        for low in [40, 10, 70, 0, 20, 50, 90] {
            set.insert(Interval::new(low, low + 5));
        }
        let mut lows = vec![];
        let mut cur = set.first();
        while let Some(id) = cur {
            lows.push(set.get(id).map(Interval::low));
            cur = set.successor(id);
        }
        let expected: Vec<_> = [0, 10, 20, 40, 50, 70, 90].into_iter().map(Some).collect();
        assert_eq!(lows, expected);
        let last = set.last().unwrap();
        assert_eq!(set.get(last), Some(&Interval::new(90, 95)));
        let root = set.find_overlapping(&set.peek().copied().unwrap()).unwrap();
        assert_eq!(set.minimum(root), set.first().unwrap());
    }

    #[test]
    fn remove_point_splits_interval() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(5, 10));
        assert!(set.remove_point(5));
        assert_eq!(stored(&set), vec![(6, 10)]);
        assert!(set.remove_point(10));
        assert_eq!(stored(&set), vec![(6, 9)]);
        assert!(set.remove_point(7));
        assert_eq!(stored(&set), vec![(6, 6), (8, 9)]);
        assert!(!set.remove_point(7));
        assert!(!set.remove_point(100));
        assert_eq!(set.sum_lengths(), 3);
    }

    #[test]
    fn consuming_merged_input_takes_covered_length() {
        let mut set = IntervalSet::new();
        set.insert(Interval::new(1, 10));
        set.insert(Interval::new(5, 5));
        assert_eq!(set.len(), 1);
        let mut iterations = 0;
        while set.pop_value().is_some() {
            iterations += 1;
        }
        assert_eq!(iterations, 10);
        assert!(set.is_empty());
    }

    #[test]
    fn collect_and_extend_merge() {
        let mut set: IntervalSet = [Interval::new(1, 4), Interval::new(3, 6)]
            .into_iter()
            .collect();
        set.extend([Interval::new(6, 9), Interval::new(20, 21)]);
        assert_eq!(stored(&set), vec![(1, 9), (20, 21)]);
        let borrowed: Vec<_> = (&set).into_iter().copied().collect();
        assert_eq!(borrowed, vec![Interval::new(1, 9), Interval::new(20, 21)]);
    }
}
