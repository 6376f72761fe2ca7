//! Ordered-map operations over the engine, driven by a three-way comparator.
//!
//! Comparators receive a record already in the tree and return how the
//! search key orders relative to it: `Less` descends left, `Greater`
//! descends right, `Equal` is a match.

use core::cmp::Ordering;

use crate::error::{Error, Result};
use crate::links::{LinkOps, NodeStore};
use crate::rbtree::{self, Root, Side};

/// Records that carry their own sort key.
pub trait Keyed {
    type Key: Ord + ?Sized;

    fn key(&self) -> &Self::Key;
}

/// Finds the node `cmp` reports as `Equal`.
pub fn search<S, F>(store: &S, root: &Root<S::Node>, mut cmp: F) -> Option<S::Node>
where
    S: NodeStore + ?Sized,
    F: FnMut(&S::Record) -> Ordering,
{
    let mut cursor = root.node();
    while let Some(node) = cursor {
        cursor = match cmp(store.record(node)) {
            Ordering::Less => store.left_of(node),
            Ordering::Greater => store.right_of(node),
            Ordering::Equal => return Some(node),
        };
    }
    None
}

/// Finds the empty slot a new key belongs in, as the `parent` and `side`
/// arguments of [`rbtree::link_node`].
///
/// # Errors
///
/// [`Error::Duplicate`] if `cmp` reports a node as `Equal`.
pub fn find_slot<S, F>(
    store: &S,
    root: &Root<S::Node>,
    mut cmp: F,
) -> Result<(Option<S::Node>, Side)>
where
    S: NodeStore + ?Sized,
    F: FnMut(&S::Record) -> Ordering,
{
    let mut parent = None;
    let mut side = Side::Left;
    let mut cursor = root.node();
    while let Some(node) = cursor {
        parent = Some(node);
        cursor = match cmp(store.record(node)) {
            Ordering::Less => {
                side = Side::Left;
                store.left_of(node)
            }
            Ordering::Greater => {
                side = Side::Right;
                store.right_of(node)
            }
            Ordering::Equal => return Err(Error::Duplicate),
        };
    }
    Ok((parent, side))
}

/// Links the unlinked `node` at the position `cmp` selects and rebalances.
///
/// # Errors
///
/// - [`Error::AlreadyLinked`] if `node` is already in a tree.
/// - [`Error::Duplicate`] if `cmp` reports a node as `Equal`.
///
/// The tree is unchanged on error.
pub fn insert<S, F>(store: &mut S, root: &mut Root<S::Node>, node: S::Node, cmp: F) -> Result<()>
where
    S: NodeStore + ?Sized,
    F: FnMut(&S::Record) -> Ordering,
{
    if store.is_linked(node) {
        return Err(Error::AlreadyLinked);
    }
    let (parent, side) = find_slot(store, root, cmp)?;
    rbtree::link_node(store, root, node, parent, side)?;
    rbtree::insert_color(store, root, node);
    Ok(())
}

/// Unlinks the node `cmp` reports as `Equal` and returns it.
///
/// The node's storage is untouched; releasing it is up to the caller.
pub fn delete<S, F>(store: &mut S, root: &mut Root<S::Node>, cmp: F) -> Option<S::Node>
where
    S: NodeStore + ?Sized,
    F: FnMut(&S::Record) -> Ordering,
{
    let node = search(store, root, cmp)?;
    // Reached from the root, so the node is linked and erase cannot fail.
    rbtree::erase(store, root, node).ok()?;
    Some(node)
}
