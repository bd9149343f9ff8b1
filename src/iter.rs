use crate::index::{IndexType, NodeIndex};
use crate::interval::Interval;
use crate::intervalset::IntervalSet;
use crate::node::Node;

/// Pushes a link of nodes on the left to stack.
fn left_link<Ix>(set_ref: &IntervalSet<Ix>, mut x: NodeIndex<Ix>) -> Vec<NodeIndex<Ix>>
where
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !set_ref.is_sentinel(x) {
        nodes.push(x);
        x = set_ref.node_ref(x, Node::left);
    }
    nodes
}

/// An iterator over the intervals of an `IntervalSet`, sorted by low endpoint.
#[derive(Debug)]
pub struct Iter<'a, Ix> {
    /// Reference to the set
    set_ref: &'a IntervalSet<Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<'a, Ix> Iter<'a, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(set_ref: &'a IntervalSet<Ix>) -> Self {
        Iter {
            set_ref,
            stack: left_link(set_ref, set_ref.root),
        }
    }
}

impl<'a, Ix> Iterator for Iter<'a, Ix>
where
    Ix: IndexType,
{
    type Item = &'a Interval;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.stack
            .extend(left_link(self.set_ref, self.set_ref.node_ref(x, Node::right)));
        Some(self.set_ref.node_ref(x, Node::interval))
    }
}

/// An owning iterator over the intervals of an `IntervalSet`, sorted by low endpoint.
#[derive(Debug)]
pub struct IntoIter<Ix> {
    interval_set: IntervalSet<Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<Ix> IntoIter<Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(interval_set: IntervalSet<Ix>) -> Self {
        let stack = left_link(&interval_set, interval_set.root);
        IntoIter {
            interval_set,
            stack,
        }
    }
}

impl<Ix> Iterator for IntoIter<Ix>
where
    Ix: IndexType,
{
    type Item = Interval;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.stack.extend(left_link(
            &self.interval_set,
            self.interval_set.node_ref(x, Node::right),
        ));
        self.interval_set.nodes[x.index()].interval.take()
    }
}

/// An iterator over the intervals of an `IntervalSet` that overlap a query.
/// It's equal to `iter().filter()` but faster than the latter.
#[derive(Debug)]
pub struct OverlapIter<'a, Ix> {
    /// Reference to the set
    set_ref: &'a IntervalSet<Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
    /// Filter criteria
    query: Interval,
}

/// Like `left_link`, but skips subtrees that end before the query and nodes that
/// start after it.
fn left_link_with_query<Ix>(
    set_ref: &IntervalSet<Ix>,
    mut x: NodeIndex<Ix>,
    query: &Interval,
) -> Vec<NodeIndex<Ix>>
where
    Ix: IndexType,
{
    let mut stack = vec![];
    if set_ref.is_sentinel(x) || set_ref.node_ref(x, Node::max) < query.low {
        return stack;
    }
    while !set_ref.is_sentinel(x) {
        if set_ref.node_ref(x, Node::interval).low <= query.high {
            stack.push(x);
        }
        let left = set_ref.node_ref(x, Node::left);
        if set_ref.is_sentinel(left) || set_ref.node_ref(left, Node::max) < query.low {
            break;
        }
        x = left;
    }
    stack
}

impl<'a, Ix> OverlapIter<'a, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(set_ref: &'a IntervalSet<Ix>, query: Interval) -> Self {
        OverlapIter {
            set_ref,
            stack: left_link_with_query(set_ref, set_ref.root, &query),
            query,
        }
    }
}

impl<'a, Ix> Iterator for OverlapIter<'a, Ix>
where
    Ix: IndexType,
{
    type Item = &'a Interval;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let mut x = self.stack.pop()?;
        while !self.set_ref.node_ref(x, Node::interval).overlap(&self.query) {
            self.stack.extend(left_link_with_query(
                self.set_ref,
                self.set_ref.node_ref(x, Node::right),
                &self.query,
            ));
            x = self.stack.pop()?;
        }
        self.stack.extend(left_link_with_query(
            self.set_ref,
            self.set_ref.node_ref(x, Node::right),
            &self.query,
        ));
        Some(self.set_ref.node_ref(x, Node::interval))
    }
}
