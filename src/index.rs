use std::fmt;
use std::hash::Hash;

pub type DefaultIx = u32;

/// Integer type used to address nodes in the arena.
///
/// # Safety
///
/// `new` and `index` must round-trip for every value below `max().index()`.
pub unsafe trait IndexType: Copy + Default + Hash + Ord + fmt::Debug + 'static {
    fn new(x: usize) -> Self;
    fn index(&self) -> usize;
    fn max() -> Self;
}

unsafe impl IndexType for u32 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u32
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max() -> Self {
        u32::MAX
    }
}

unsafe impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self
    }
    #[inline(always)]
    fn max() -> Self {
        usize::MAX
    }
}

/// Arena slot identifier.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct NodeIndex<Ix = DefaultIx>(Ix);

impl<Ix: IndexType> NodeIndex<Ix> {
    #[inline]
    pub fn new(x: usize) -> Self {
        NodeIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// The slot holding the sentinel.
    #[inline]
    pub fn sentinel() -> Self {
        NodeIndex::new(0)
    }

    #[inline]
    pub fn end() -> Self {
        NodeIndex(IndexType::max())
    }
}

impl<Ix: fmt::Debug> fmt::Debug for NodeIndex<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeIndex({:?})", self.0)
    }
}

/// Handle to a node stored in an [`IntervalSet`](crate::IntervalSet).
///
/// A `NodeId` is a slot index paired with the generation of that slot and a tag
/// naming the set that issued it. It stays valid while the node it names is
/// stored, no matter how the tree is rebalanced around it. Deleting the node
/// (directly, or by merging it into a newer insert) frees the slot and bumps its
/// generation, so the handle goes stale and does not alias a node created later
/// in the same slot. A slot whose generation reaches `u32::MAX` is retired
/// rather than reused.
///
/// A handle only belongs to the set that returned it; other sets treat it as
/// stale. Set tags come from a process-wide 32-bit counter, so two sets can only
/// share a tag after 2^32 sets have been created.
///
/// Use [`IntervalSet::is_alive`](crate::IntervalSet::is_alive) to check a handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId<Ix = DefaultIx> {
    pub(crate) index: NodeIndex<Ix>,
    pub(crate) generation: u32,
    pub(crate) tag: u32,
}

impl<Ix: IndexType> NodeId<Ix> {
    #[inline]
    pub(crate) fn new(index: NodeIndex<Ix>, generation: u32, tag: u32) -> Self {
        Self {
            index,
            generation,
            tag,
        }
    }
}

impl<Ix: fmt::Debug> fmt::Debug for NodeId<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NodeId({:?}v{}@{})",
            self.index.0, self.generation, self.tag
        )
    }
}
