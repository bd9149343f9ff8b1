use crate::index::{IndexType, NodeIndex};
use crate::interval::Interval;

/// Slot of the arena backing the interval tree.
///
/// Slot 0 is the sentinel. Every other slot is either a live node or a freed
/// slot waiting on the free list; both the sentinel and freed slots have no
/// interval.
#[derive(Debug)]
pub struct Node<Ix> {
    /// Left child
    pub left: NodeIndex<Ix>,
    /// Right child
    pub right: NodeIndex<Ix>,
    /// Parent
    pub parent: NodeIndex<Ix>,
    /// Color of the node
    pub color: Color,

    /// Interval of the node
    pub interval: Option<Interval>,
    /// Max high endpoint in the subtree rooted here, `i64::MIN` for the sentinel
    pub max: i64,
    /// Bumped every time the slot is freed, saturating at `u32::MAX`
    pub generation: u32,
}

impl<Ix> Node<Ix>
where
    Ix: IndexType,
{
    /// The shared sentinel: black, no interval, max of negative infinity.
    pub fn new_sentinel() -> Self {
        Node {
            left: NodeIndex::sentinel(),
            right: NodeIndex::sentinel(),
            parent: NodeIndex::sentinel(),
            color: Color::Black,
            interval: None,
            max: i64::MIN,
            generation: 0,
        }
    }

    /// A fresh red leaf holding `interval`.
    pub fn new_leaf(interval: Interval, generation: u32) -> Self {
        Node {
            left: NodeIndex::sentinel(),
            right: NodeIndex::sentinel(),
            parent: NodeIndex::sentinel(),
            color: Color::Red,
            max: interval.high,
            interval: Some(interval),
            generation,
        }
    }
}

// Convenient getter/setter methods
impl<Ix> Node<Ix>
where
    Ix: IndexType,
{
    pub fn color(&self) -> Color {
        self.color
    }

    /// # Panics
    ///
    /// Panics on the sentinel or a freed slot.
    pub fn interval(&self) -> &Interval {
        self.interval
            .as_ref()
            .unwrap_or_else(|| panic!("sentinel has no interval"))
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn left(&self) -> NodeIndex<Ix> {
        self.left
    }

    pub fn right(&self) -> NodeIndex<Ix> {
        self.right
    }

    pub fn parent(&self) -> NodeIndex<Ix> {
        self.parent
    }

    pub fn is_vacant(&self) -> bool {
        self.interval.is_none()
    }

    /// A slot whose generation ran out is never handed out again.
    pub fn is_retired(&self) -> bool {
        self.generation == u32::MAX
    }

    pub fn is_black(&self) -> bool {
        matches!(self.color, Color::Black)
    }

    pub fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    pub fn set_color(color: Color) -> impl FnOnce(&mut Node<Ix>) {
        move |node: &mut Node<Ix>| {
            node.color = color;
        }
    }

    pub fn set_max(max: i64) -> impl FnOnce(&mut Node<Ix>) {
        move |node: &mut Node<Ix>| {
            node.max = max;
        }
    }

    pub fn set_left(left: NodeIndex<Ix>) -> impl FnOnce(&mut Node<Ix>) {
        move |node: &mut Node<Ix>| {
            node.left = left;
        }
    }

    pub fn set_right(right: NodeIndex<Ix>) -> impl FnOnce(&mut Node<Ix>) {
        move |node: &mut Node<Ix>| {
            node.right = right;
        }
    }

    pub fn set_parent(parent: NodeIndex<Ix>) -> impl FnOnce(&mut Node<Ix>) {
        move |node: &mut Node<Ix>| {
            node.parent = parent;
        }
    }

    /// Empty a live slot and invalidate every handle to it.
    pub fn vacate(&mut self) -> Interval {
        let interval = *self.interval();
        self.interval = None;
        self.generation = self.generation.saturating_add(1);
        self.left = NodeIndex::sentinel();
        self.right = NodeIndex::sentinel();
        self.parent = NodeIndex::sentinel();
        self.color = Color::Black;
        self.max = i64::MIN;
        interval
    }
}

/// The color of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node
    Red,
    /// Black node
    Black,
}
