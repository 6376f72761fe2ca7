use core::cmp::Ordering;
use core::fmt;

use crate::links::{Color, LinkOps, NodeStore};

use super::traverse::{first, next};
use super::Root;

/// Shape of a tree that passed [`check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Report {
    /// Number of nodes.
    pub len: usize,
    /// Nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Black nodes on every root-to-leaf path, the root included.
    pub black_height: usize,
}

/// The first broken invariant [`check`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation<H> {
    /// The root has a parent.
    RootHasParent(H),
    /// The root is red.
    RedRoot(H),
    /// A node reachable from the root is flagged as unlinked.
    Unlinked(H),
    /// A child's parent link does not point back at its parent.
    BrokenParent { node: H, parent: Option<H> },
    /// A red node has a red parent.
    RedRed { node: H, parent: H },
    /// The two subtrees of `node` have different black heights.
    BlackHeight { node: H, left: usize, right: usize },
    /// In-order neighbours are not strictly increasing.
    OutOfOrder { prev: H, next: H },
}

impl<H: fmt::Debug> fmt::Display for Violation<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RootHasParent(node) => write!(f, "root {node:?} has a parent"),
            Violation::RedRoot(node) => write!(f, "root {node:?} is red"),
            Violation::Unlinked(node) => write!(f, "node {node:?} is in the tree but unlinked"),
            Violation::BrokenParent { node, parent } => {
                write!(f, "node {node:?} points at parent {parent:?}")
            }
            Violation::RedRed { node, parent } => {
                write!(f, "red node {node:?} has red parent {parent:?}")
            }
            Violation::BlackHeight { node, left, right } => write!(
                f,
                "node {node:?} has black height {left} on the left and {right} on the right"
            ),
            Violation::OutOfOrder { prev, next } => {
                write!(f, "node {prev:?} does not order before {next:?}")
            }
        }
    }
}

impl<H: fmt::Debug> core::error::Error for Violation<H> {}

/// Verifies every red-black and search-tree invariant of the tree at `root`.
///
/// `cmp` orders two records; in-order neighbours must compare strictly
/// `Less`. Recurses once per tree level.
pub fn check<S, F>(
    store: &S,
    root: &Root<S::Node>,
    mut cmp: F,
) -> Result<Report, Violation<S::Node>>
where
    S: NodeStore + ?Sized,
    F: FnMut(&S::Record, &S::Record) -> Ordering,
{
    let Some(top) = root.node() else {
        return Ok(Report::default());
    };

    if store.parent_of(top).is_some() {
        return Err(Violation::RootHasParent(top));
    }
    if store.color_of(top) == Color::Red {
        return Err(Violation::RedRoot(top));
    }

    let report = walk(store, top)?;

    let mut cursor = first(store, root);
    while let Some(prev) = cursor {
        cursor = next(store, prev);
        if let Some(next) = cursor {
            if cmp(store.record(prev), store.record(next)) != Ordering::Less {
                return Err(Violation::OutOfOrder { prev, next });
            }
        }
    }

    Ok(report)
}

fn walk<S: NodeStore + ?Sized>(
    store: &S,
    node: S::Node,
) -> Result<Report, Violation<S::Node>> {
    if !store.is_linked(node) {
        return Err(Violation::Unlinked(node));
    }

    let mut sides = [Report::default(); 2];
    for (side, child) in sides
        .iter_mut()
        .zip([store.left_of(node), store.right_of(node)])
    {
        let Some(child) = child else {
            continue;
        };
        let parent = store.parent_of(child);
        if parent != Some(node) {
            return Err(Violation::BrokenParent {
                node: child,
                parent,
            });
        }
        if store.is_red(Some(node)) && store.is_red(Some(child)) {
            return Err(Violation::RedRed { node: child, parent: node });
        }
        *side = walk(store, child)?;
    }

    let [left, right] = sides;
    if left.black_height != right.black_height {
        return Err(Violation::BlackHeight {
            node,
            left: left.black_height,
            right: right.black_height,
        });
    }

    Ok(Report {
        len: left.len + right.len + 1,
        height: left.height.max(right.height) + 1,
        black_height: left.black_height + usize::from(store.color_of(node) == Color::Black),
    })
}
