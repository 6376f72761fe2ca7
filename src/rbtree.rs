//! The red-black tree engine.
//!
//! Every function here works on a caller-owned [`Root`] plus a
//! [`NodeStore`] that resolves node handles. None of them allocate, and none
//! of them inspect records: ordering decisions live in
//! [`keyed`](crate::keyed) or with the caller.
//!
//! Linking a node is two steps, exactly as with an intrusive tree in C:
//! [`link_node`] hangs an unlinked node as a red leaf in a known-empty slot,
//! then [`insert_color`] restores the red-black invariants.
//!
//! ```
//! use allocated_rbtree::rbtree::{self, Root, Side};
//! use allocated_rbtree::{Arena, Linked, Links, NodeId};
//!
//! struct Item {
//!     links: Links<NodeId>,
//!     key: u32,
//! }
//!
//! impl Linked<NodeId> for Item {
//!     fn links(&self) -> &Links<NodeId> {
//!         &self.links
//!     }
//!
//!     fn links_mut(&mut self) -> &mut Links<NodeId> {
//!         &mut self.links
//!     }
//! }
//!
//! let mut arena = Arena::new();
//! let mut root = Root::new();
//!
//! let a = arena.insert(Item { links: Links::new(), key: 2 })?;
//! let b = arena.insert(Item { links: Links::new(), key: 1 })?;
//!
//! rbtree::link_node(&mut arena, &mut root, a, None, Side::Left)?;
//! rbtree::insert_color(&mut arena, &mut root, a);
//! rbtree::link_node(&mut arena, &mut root, b, Some(a), Side::Left)?;
//! rbtree::insert_color(&mut arena, &mut root, b);
//!
//! assert_eq!(rbtree::first(&arena, &root), Some(b));
//! assert_eq!(rbtree::next(&arena, b), Some(a));
//! # Ok::<(), allocated_rbtree::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::links::{LinkOps, NodeStore};

mod check;
mod erase;
mod insert;
mod replace;
mod rotate;
mod traverse;


pub use check::{check, Report, Violation};
pub use erase::{erase, erase_color};
pub use insert::insert_color;
pub use replace::replace_node;
pub use rotate::{rotate_left, rotate_right};
pub use traverse::{first, last, next, prev, Nodes};

/// The top of a tree, owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Root<H> {
    node: Option<H>,
}

impl<H> Root<H> {
    /// Creates an empty root.
    pub const fn new() -> Self {
        Root { node: None }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Forgets every node of the tree.
    ///
    /// The nodes themselves are left as they were; releasing or reusing them
    /// is up to the caller.
    pub fn clear(&mut self) {
        self.node = None;
    }
}

impl<H: Copy> Root<H> {
    /// Returns the top node, if the tree is not empty.
    #[inline]
    pub fn node(&self) -> Option<H> {
        self.node
    }

    #[inline]
    pub(crate) fn set(&mut self, node: Option<H>) {
        self.node = node;
    }
}

impl<H> Default for Root<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Which child slot of a parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Links an unlinked `node` as a red leaf below `parent` on `side`, or as
/// the root when `parent` is `None` (`side` is then ignored).
///
/// The tree is not rebalanced; follow up with [`insert_color`].
///
/// # Errors
///
/// - [`Error::AlreadyLinked`] if `node` is already in a tree.
/// - [`Error::NotLinked`] if `parent` is not in a tree.
/// - [`Error::SlotOccupied`] if the target slot already holds a node.
pub fn link_node<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
    parent: Option<S::Node>,
    side: Side,
) -> Result<()> {
    if store.is_linked(node) {
        return Err(Error::AlreadyLinked);
    }

    match parent {
        None => {
            if !root.is_empty() {
                return Err(Error::SlotOccupied);
            }
            root.set(Some(node));
        }
        Some(parent) => {
            if !store.is_linked(parent) {
                return Err(Error::NotLinked);
            }
            let slot = match side {
                Side::Left => store.left_of(parent),
                Side::Right => store.right_of(parent),
            };
            if slot.is_some() {
                return Err(Error::SlotOccupied);
            }
            match side {
                Side::Left => store.set_left(parent, Some(node)),
                Side::Right => store.set_right(parent, Some(node)),
            }
        }
    }

    store.links_mut(node).link(parent);
    Ok(())
}

/// Points whichever slot held `old` (a child slot of `parent`, or the root)
/// at `new`.
fn replace_child<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    parent: Option<S::Node>,
    old: S::Node,
    new: Option<S::Node>,
) {
    match parent {
        Some(parent) => {
            if store.left_of(parent) == Some(old) {
                store.set_left(parent, new);
            } else {
                store.set_right(parent, new);
            }
        }
        None => root.set(new),
    }
}
