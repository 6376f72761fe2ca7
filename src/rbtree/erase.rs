use crate::error::{Error, Result};
use crate::links::{Color, LinkOps, NodeStore};

use super::rotate::{rotate_left_onto, rotate_right_onto};
use super::{replace_child, Root};

/// Removes `node` from the tree and rebalances.
///
/// A node with two children is replaced structurally by its in-order
/// successor, which takes over the node's parent, children and color. On
/// return `node` is unlinked and may be linked into a tree again.
///
/// # Errors
///
/// [`Error::NotLinked`] if `node` is not in a tree.
pub fn erase<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    node: S::Node,
) -> Result<()> {
    if !store.is_linked(node) {
        return Err(Error::NotLinked);
    }

    let (child, parent, color) = match (store.left_of(node), store.right_of(node)) {
        (Some(left), Some(right)) => {
            let mut successor = right;
            while let Some(next) = store.left_of(successor) {
                successor = next;
            }

            let old_parent = store.parent_of(node);
            replace_child(store, root, old_parent, node, Some(successor));

            let child = store.right_of(successor);
            let color = store.color_of(successor);
            let parent = if successor == right {
                Some(successor)
            } else {
                // The successor is the leftmost node of `right`, so it hangs
                // from its parent's left slot.
                let parent = store.parent_of(successor);
                if let Some(child) = child {
                    store.set_parent(child, parent);
                }
                if let Some(parent) = parent {
                    store.set_left(parent, child);
                }
                store.set_right(successor, Some(right));
                store.set_parent(right, Some(successor));
                parent
            };

            let old_color = store.color_of(node);
            store.set_parent(successor, old_parent);
            store.set_color(successor, old_color);
            store.set_left(successor, Some(left));
            store.set_parent(left, Some(successor));

            (child, parent, color)
        }
        (left, right) => {
            let child = left.or(right);
            let parent = store.parent_of(node);
            let color = store.color_of(node);

            if let Some(child) = child {
                store.set_parent(child, parent);
            }
            replace_child(store, root, parent, node, child);

            (child, parent, color)
        }
    };

    store.links_mut(node).unlink();

    if color == Color::Black {
        erase_color(store, root, child, parent);
    }
    Ok(())
}

/// Repairs a black-height deficit at `node`, which sits below `parent`
/// (`node` is `None` when the deficit is at an empty slot of `parent`).
///
/// Called by [`erase`] after splicing out a black node; exposed for callers
/// that splice nodes themselves.
pub fn erase_color<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    mut node: Option<S::Node>,
    mut parent: Option<S::Node>,
) {
    while store.is_black(node) && node != root.node() {
        let Some(p) = parent else {
            break;
        };

        if store.left_of(p) == node {
            let Some(mut other) = store.right_of(p) else {
                break;
            };

            if store.is_red(Some(other)) {
                store.set_color(other, Color::Black);
                store.set_color(p, Color::Red);
                rotate_left_onto(store, root, p, other);
                let Some(sibling) = store.right_of(p) else {
                    break;
                };
                other = sibling;
            }

            if store.is_black(store.left_of(other)) && store.is_black(store.right_of(other)) {
                store.set_color(other, Color::Red);
                node = Some(p);
                parent = store.parent_of(p);
            } else {
                if store.is_black(store.right_of(other)) {
                    if let Some(near) = store.left_of(other) {
                        store.set_color(near, Color::Black);
                        store.set_color(other, Color::Red);
                        rotate_right_onto(store, root, other, near);
                        other = near;
                    }
                }

                let parent_color = store.color_of(p);
                store.set_color(other, parent_color);
                store.set_color(p, Color::Black);
                if let Some(far) = store.right_of(other) {
                    store.set_color(far, Color::Black);
                }
                rotate_left_onto(store, root, p, other);
                node = root.node();
                break;
            }
        } else {
            let Some(mut other) = store.left_of(p) else {
                break;
            };

            if store.is_red(Some(other)) {
                store.set_color(other, Color::Black);
                store.set_color(p, Color::Red);
                rotate_right_onto(store, root, p, other);
                let Some(sibling) = store.left_of(p) else {
                    break;
                };
                other = sibling;
            }

            if store.is_black(store.left_of(other)) && store.is_black(store.right_of(other)) {
                store.set_color(other, Color::Red);
                node = Some(p);
                parent = store.parent_of(p);
            } else {
                if store.is_black(store.left_of(other)) {
                    if let Some(near) = store.right_of(other) {
                        store.set_color(near, Color::Black);
                        store.set_color(other, Color::Red);
                        rotate_left_onto(store, root, other, near);
                        other = near;
                    }
                }

                let parent_color = store.color_of(p);
                store.set_color(other, parent_color);
                store.set_color(p, Color::Black);
                if let Some(far) = store.left_of(other) {
                    store.set_color(far, Color::Black);
                }
                rotate_right_onto(store, root, p, other);
                node = root.node();
                break;
            }
        }
    }

    if let Some(node) = node {
        store.set_color(node, Color::Black);
    }
}
