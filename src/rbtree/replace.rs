use crate::error::{Error, Result};
use crate::links::{LinkOps, NodeStore};

use super::{replace_child, Root};

/// Puts `replacement` into the exact position of `victim` (parent slot,
/// children and color) without rebalancing, and unlinks `victim`.
///
/// The caller guarantees `replacement` orders the same as `victim`; nothing
/// here compares keys.
///
/// # Errors
///
/// - [`Error::NotLinked`] if `victim` is not in a tree.
/// - [`Error::AlreadyLinked`] if `replacement` is in a tree.
pub fn replace_node<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    victim: S::Node,
    replacement: S::Node,
) -> Result<()> {
    if !store.is_linked(victim) {
        return Err(Error::NotLinked);
    }
    if store.is_linked(replacement) {
        return Err(Error::AlreadyLinked);
    }

    let links = *store.links(victim);

    replace_child(store, root, links.parent(), victim, Some(replacement));
    if let Some(left) = links.left() {
        store.set_parent(left, Some(replacement));
    }
    if let Some(right) = links.right() {
        store.set_parent(right, Some(replacement));
    }

    *store.links_mut(replacement) = links;
    store.links_mut(victim).unlink();
    Ok(())
}
