use core::mem;

use crate::links::{Color, LinkOps, NodeStore};

use super::rotate::{rotate_left_onto, rotate_right_onto};
use super::Root;

/// Restores the red-black invariants after `node` was linked as a red leaf.
///
/// Walks upward while `node` has a red parent: a red uncle is absorbed by
/// recoloring and the walk continues from the grandparent; otherwise one or
/// two rotations finish the repair. The root is painted black on exit.
pub fn insert_color<S: NodeStore + ?Sized>(
    store: &mut S,
    root: &mut Root<S::Node>,
    mut node: S::Node,
) {
    debug_assert!(store.is_linked(node));

    while let Some(mut parent) = store.parent_of(node) {
        if store.is_black(Some(parent)) {
            break;
        }
        // A red parent is never the root, so the grandparent exists.
        let Some(gparent) = store.parent_of(parent) else {
            break;
        };

        if store.left_of(gparent) == Some(parent) {
            if let Some(uncle) = store.right_of(gparent).filter(|&u| store.is_red(Some(u))) {
                store.set_color(uncle, Color::Black);
                store.set_color(parent, Color::Black);
                store.set_color(gparent, Color::Red);
                node = gparent;
                continue;
            }

            if store.right_of(parent) == Some(node) {
                rotate_left_onto(store, root, parent, node);
                mem::swap(&mut parent, &mut node);
            }

            store.set_color(parent, Color::Black);
            store.set_color(gparent, Color::Red);
            rotate_right_onto(store, root, gparent, parent);
        } else {
            if let Some(uncle) = store.left_of(gparent).filter(|&u| store.is_red(Some(u))) {
                store.set_color(uncle, Color::Black);
                store.set_color(parent, Color::Black);
                store.set_color(gparent, Color::Red);
                node = gparent;
                continue;
            }

            if store.left_of(parent) == Some(node) {
                rotate_right_onto(store, root, parent, node);
                mem::swap(&mut parent, &mut node);
            }

            store.set_color(parent, Color::Black);
            store.set_color(gparent, Color::Red);
            rotate_left_onto(store, root, gparent, parent);
        }
    }

    if let Some(top) = root.node() {
        store.set_color(top, Color::Black);
    }
}
