//! Node linkage embedded in caller records, and the storage seam the engine
//! mutates through.

use core::fmt::Debug;

/// Color tag of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Freshly linked nodes start red.
    #[default]
    Red,
    /// Absent children count as black.
    Black,
}

/// Tree linkage for one node, embedded in the caller's record.
///
/// `H` is the handle type the owning store addresses nodes by. A new
/// `Links` is unlinked; it becomes linked when the node enters a tree and is
/// reset to unlinked when the node is erased or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Links<H> {
    parent: Option<H>,
    left: Option<H>,
    right: Option<H>,
    color: Color,
    linked: bool,
}

impl<H> Links<H> {
    /// Creates unlinked node links.
    pub const fn new() -> Self {
        Links {
            parent: None,
            left: None,
            right: None,
            color: Color::Red,
            linked: false,
        }
    }

    /// Returns `true` if the node currently sits in a tree.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn unlink(&mut self) {
        *self = Links::new();
    }

    pub(crate) fn link(&mut self, parent: Option<H>) {
        self.parent = parent;
        self.left = None;
        self.right = None;
        self.color = Color::Red;
        self.linked = true;
    }
}

impl<H: Copy> Links<H> {
    #[inline]
    pub fn parent(&self) -> Option<H> {
        self.parent
    }

    #[inline]
    pub fn left(&self) -> Option<H> {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Option<H> {
        self.right
    }
}

impl<H> Default for Links<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by caller records that embed a [`Links`].
///
/// # Example
///
/// ```
/// use allocated_rbtree::{Linked, Links, NodeId};
///
/// struct Job {
///     links: Links<NodeId>,
///     deadline: u64,
/// }
///
/// impl Linked<NodeId> for Job {
///     fn links(&self) -> &Links<NodeId> {
///         &self.links
///     }
///
///     fn links_mut(&mut self) -> &mut Links<NodeId> {
///         &mut self.links
///     }
/// }
/// ```
pub trait Linked<H> {
    fn links(&self) -> &Links<H>;
    fn links_mut(&mut self) -> &mut Links<H>;
}

/// Storage that resolves node handles to records and their links.
///
/// The engine functions in [`rbtree`](crate::rbtree) and
/// [`keyed`](crate::keyed) operate on any `NodeStore`, so the same
/// rebalancing code serves index-addressed arenas and pointer-addressed
/// record tables alike.
pub trait NodeStore {
    /// Handle addressing one node.
    type Node: Copy + Eq + Debug;
    /// Record type comparators see.
    type Record: ?Sized;

    fn record(&self, node: Self::Node) -> &Self::Record;
    fn links(&self, node: Self::Node) -> &Links<Self::Node>;
    fn links_mut(&mut self, node: Self::Node) -> &mut Links<Self::Node>;
}

/// Field-level accessors over a [`NodeStore`], so the engine never holds
/// two borrows of the store at once.
pub(crate) trait LinkOps: NodeStore {
    #[inline]
    fn parent_of(&self, node: Self::Node) -> Option<Self::Node> {
        self.links(node).parent
    }

    #[inline]
    fn left_of(&self, node: Self::Node) -> Option<Self::Node> {
        self.links(node).left
    }

    #[inline]
    fn right_of(&self, node: Self::Node) -> Option<Self::Node> {
        self.links(node).right
    }

    #[inline]
    fn color_of(&self, node: Self::Node) -> Color {
        self.links(node).color
    }

    #[inline]
    fn is_linked(&self, node: Self::Node) -> bool {
        self.links(node).linked
    }

    #[inline]
    fn is_red(&self, node: Option<Self::Node>) -> bool {
        node.is_some_and(|n| self.color_of(n) == Color::Red)
    }

    #[inline]
    fn is_black(&self, node: Option<Self::Node>) -> bool {
        !self.is_red(node)
    }

    #[inline]
    fn set_parent(&mut self, node: Self::Node, parent: Option<Self::Node>) {
        self.links_mut(node).parent = parent;
    }

    #[inline]
    fn set_left(&mut self, node: Self::Node, left: Option<Self::Node>) {
        self.links_mut(node).left = left;
    }

    #[inline]
    fn set_right(&mut self, node: Self::Node, right: Option<Self::Node>) {
        self.links_mut(node).right = right;
    }

    #[inline]
    fn set_color(&mut self, node: Self::Node, color: Color) {
        self.links_mut(node).color = color;
    }
}

impl<S: NodeStore + ?Sized> LinkOps for S {}
