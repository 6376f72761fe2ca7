use crate::error::{Error, Result};
use crate::links::{LinkOps, NodeStore};

use super::{replace_child, Root};

/// Rotates `node` down to the left, promoting its right child into its
/// position. In-order sequence is preserved; colors are untouched.
///
/// # Errors
///
/// - [`Error::NotLinked`] if `node` is not in a tree.
/// - [`Error::MissingChild`] if `node` has no right child.
pub fn rotate_left<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
) -> Result<()> {
    if !store.is_linked(node) {
        return Err(Error::NotLinked);
    }
    let right = store.right_of(node).ok_or(Error::MissingChild)?;
    rotate_left_onto(store, root, node, right);
    Ok(())
}

/// Rotates `node` down to the right, promoting its left child into its
/// position. In-order sequence is preserved; colors are untouched.
///
/// # Errors
///
/// - [`Error::NotLinked`] if `node` is not in a tree.
/// - [`Error::MissingChild`] if `node` has no left child.
pub fn rotate_right<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
) -> Result<()> {
    if !store.is_linked(node) {
        return Err(Error::NotLinked);
    }
    let left = store.left_of(node).ok_or(Error::MissingChild)?;
    rotate_right_onto(store, root, node, left);
    Ok(())
}

/// `right` must be the right child of `node`.
pub(super) fn rotate_left_onto<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
    right: S::Node,
) {
    debug_assert_eq!(store.right_of(node), Some(right));

    let parent = store.parent_of(node);
    let inner = store.left_of(right);

    store.set_right(node, inner);
    if let Some(inner) = inner {
        store.set_parent(inner, Some(node));
    }
    store.set_left(right, Some(node));
    store.set_parent(right, parent);
    replace_child(store, root, parent, node, Some(right));
    store.set_parent(node, Some(right));
}

/// `left` must be the left child of `node`.
pub(super) fn rotate_right_onto<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
    left: S::Node,
) {
    debug_assert_eq!(store.left_of(node), Some(left));

    let parent = store.parent_of(node);
    let inner = store.right_of(left);

    store.set_left(node, inner);
    if let Some(inner) = inner {
        store.set_parent(inner, Some(node));
    }
    store.set_right(left, Some(node));
    store.set_parent(left, parent);
    replace_child(store, root, parent, node, Some(left));
    store.set_parent(node, Some(left));
}
