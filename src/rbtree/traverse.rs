use crate::links::{LinkOps, NodeStore};

use super::Root;

/// Returns the first node in sort order.
pub fn first<S: NodeStore + ?Sized>(store: &S, root: &Root<S::Node>) -> Option<S::Node> {
    root.node().map(|top| leftmost(store, top))
}

/// Returns the last node in sort order.
pub fn last<S: NodeStore + ?Sized>(store: &S, root: &Root<S::Node>) -> Option<S::Node> {
    root.node().map(|top| rightmost(store, top))
}

/// Returns the in-order successor of `node`, or `None` if `node` is the last
/// node or is not linked into a tree.
///
/// # Panics
///
/// If `store` cannot resolve `node`, for example an [`Arena`] handle whose
/// record was removed. [`RbTree::next`] checks the handle first.
///
/// [`Arena`]: crate::Arena
/// [`RbTree::next`]: crate::RbTree::next
pub fn next<S: NodeStore + ?Sized>(store: &S, node: S::Node) -> Option<S::Node> {
    if !store.is_linked(node) {
        return None;
    }

    if let Some(right) = store.right_of(node) {
        return Some(leftmost(store, right));
    }

    // Everything below and to the left is smaller, so the successor is the
    // first ancestor we reach from its left subtree.
    let mut node = node;
    while let Some(parent) = store.parent_of(node) {
        if store.right_of(parent) != Some(node) {
            return Some(parent);
        }
        node = parent;
    }
    None
}

/// Returns the in-order predecessor of `node`, or `None` if `node` is the
/// first node or is not linked into a tree.
///
/// # Panics
///
/// Like [`next`], if `store` cannot resolve `node`.
pub fn prev<S: NodeStore + ?Sized>(store: &S, node: S::Node) -> Option<S::Node> {
    if !store.is_linked(node) {
        return None;
    }

    if let Some(left) = store.left_of(node) {
        return Some(rightmost(store, left));
    }

    let mut node = node;
    while let Some(parent) = store.parent_of(node) {
        if store.left_of(parent) != Some(node) {
            return Some(parent);
        }
        node = parent;
    }
    None
}

fn leftmost<S: NodeStore + ?Sized>(store: &S, mut node: S::Node) -> S::Node {
    while let Some(left) = store.left_of(node) {
        node = left;
    }
    node
}

fn rightmost<S: NodeStore + ?Sized>(store: &S, mut node: S::Node) -> S::Node {
    while let Some(right) = store.right_of(node) {
        node = right;
    }
    node
}

/// A double-ended iterator over node handles in sort order.
pub struct Nodes<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    front: Option<S::Node>,
    back: Option<S::Node>,
}

impl<'a, S: NodeStore + ?Sized> Nodes<'a, S> {
    pub fn new(store: &'a S, root: &Root<S::Node>) -> Self {
        Nodes {
            store,
            front: first(store, root),
            back: last(store, root),
        }
    }

    /// The store the handles resolve against.
    pub fn store(&self) -> &'a S {
        self.store
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<S: NodeStore + ?Sized> Iterator for Nodes<'_, S> {
    type Item = S::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front?;
        if self.back == Some(node) {
            self.finish();
        } else {
            self.front = next(self.store, node);
        }
        Some(node)
    }
}

impl<S: NodeStore + ?Sized> DoubleEndedIterator for Nodes<'_, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back?;
        if self.front == Some(node) {
            self.finish();
        } else {
            self.back = prev(self.store, node);
        }
        Some(node)
    }
}

impl<S: NodeStore + ?Sized> Clone for Nodes<'_, S> {
    fn clone(&self) -> Self {
        Nodes {
            store: self.store,
            front: self.front,
            back: self.back,
        }
    }
}
