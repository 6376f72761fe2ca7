//! An owning red-black tree over an [`Arena`].
//!
//! [`RbTree`] pairs an arena with its root so callers get a safe API:
//! handles are checked against the arena before the engine sees them.

use core::cmp::Ordering;
use core::fmt;

#[cfg(feature = "std")]
use alloc::boxed::Box;
#[cfg(feature = "std")]
use alloc::string::String;
#[cfg(feature = "std")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::error::Error as StdError;
#[cfg(feature = "std")]
use std::io::Write;

use allocator_api2::alloc::{Allocator, Global};

use crate::arena::{Arena, NodeId};
use crate::error::Error;
use crate::keyed::{self, Keyed};
use crate::links::Linked;
use crate::rbtree::{self, Nodes, Report, Root, Violation};

mod iters;

#[cfg(test)]
mod tests;

pub use iters::{Ids, Iter};

/// A rejected insert, handing the record back to the caller.
pub struct InsertError<T> {
    error: Error,
    record: T,
}

impl<T> InsertError<T> {
    /// Why the record was rejected.
    pub fn error(&self) -> Error {
        self.error
    }

    /// Takes the rejected record back.
    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<T> core::error::Error for InsertError<T> {}

impl<T> From<InsertError<T>> for Error {
    fn from(err: InsertError<T>) -> Self {
        err.error
    }
}

/// A red-black tree owning its records.
///
/// # Example
///
/// ```
/// use allocated_rbtree::{Keyed, Linked, Links, NodeId, RbTree};
///
/// struct Entry {
///     links: Links<NodeId>,
///     key: u32,
///     name: &'static str,
/// }
///
/// impl Linked<NodeId> for Entry {
///     fn links(&self) -> &Links<NodeId> {
///         &self.links
///     }
///
///     fn links_mut(&mut self) -> &mut Links<NodeId> {
///         &mut self.links
///     }
/// }
///
/// impl Keyed for Entry {
///     type Key = u32;
///
///     fn key(&self) -> &u32 {
///         &self.key
///     }
/// }
///
/// let mut tree = RbTree::new();
/// for (key, name) in [(2, "two"), (1, "one"), (3, "three")] {
///     tree.insert(Entry { links: Links::new(), key, name })?;
/// }
///
/// assert_eq!(tree.get(&2).map(|e| e.name), Some("two"));
/// let keys: Vec<u32> = tree.iter().map(|e| e.key).collect();
/// assert_eq!(keys, [1, 2, 3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RbTree<T: Linked<NodeId>, A: Allocator = Global> {
    arena: Arena<T, A>,
    root: Root<NodeId>,
}

impl<T: Linked<NodeId>> RbTree<T> {
    /// Creates an empty tree using the global allocator.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T: Linked<NodeId>> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Linked<NodeId>, A: Allocator> RbTree<T, A> {
    /// Creates an empty tree whose records are stored using `alloc`.
    pub fn new_in(alloc: A) -> Self {
        RbTree {
            arena: Arena::new_in(alloc),
            root: Root::new(),
        }
    }

    /// Returns the number of records in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Handle of the top node.
    pub fn root(&self) -> Option<NodeId> {
        self.root.node()
    }

    /// Inserts `record`, ordering it with `cmp(new, existing)`.
    ///
    /// # Errors
    ///
    /// The record comes back inside the [`InsertError`] when
    /// - another record compares `Equal` ([`Error::Duplicate`]),
    /// - `record` claims to be linked already ([`Error::AlreadyLinked`]),
    /// - the arena cannot grow ([`Error::Alloc`]).
    pub fn insert_by<F>(&mut self, record: T, mut cmp: F) -> Result<NodeId, InsertError<T>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if record.links().is_linked() {
            return Err(InsertError {
                error: Error::AlreadyLinked,
                record,
            });
        }

        let slot = keyed::find_slot(&self.arena, &self.root, |existing| cmp(&record, existing));
        let (parent, side) = match slot {
            Ok(slot) => slot,
            Err(error) => {
                log::debug!("rejected record: {error}");
                return Err(InsertError { error, record });
            }
        };
        if let Err(error) = self.arena.reserve() {
            return Err(InsertError { error, record });
        }

        let id = self.arena.insert_reserved(record);
        if let Err(error) = rbtree::link_node(&mut self.arena, &mut self.root, id, parent, side) {
            let record = self.arena.take(id);
            return Err(InsertError { error, record });
        }
        rbtree::insert_color(&mut self.arena, &mut self.root, id);

        log::trace!("linked record {id}");
        Ok(id)
    }

    /// Finds the record `cmp` reports as `Equal`.
    pub fn search_by<F>(&self, cmp: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        keyed::search(&self.arena, &self.root, cmp)
    }

    /// Removes the record `cmp` reports as `Equal` and returns it.
    pub fn remove_by<F>(&mut self, cmp: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let id = keyed::delete(&mut self.arena, &mut self.root, cmp)?;
        log::trace!("unlinked record {id}");
        Some(self.arena.take(id))
    }

    /// Removes the record at `id` and returns it.
    pub fn remove_id(&mut self, id: NodeId) -> Option<T> {
        if !self.arena.contains(id) {
            return None;
        }
        rbtree::erase(&mut self.arena, &mut self.root, id).ok()?;
        Some(self.arena.take(id))
    }

    pub fn get_id(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id)
    }

    /// Mutable access to a record.
    ///
    /// Changing the fields the tree is ordered by breaks the tree; only
    /// touch payload.
    pub fn get_id_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id)
    }

    /// The record with the smallest key.
    pub fn first(&self) -> Option<NodeId> {
        rbtree::first(&self.arena, &self.root)
    }

    /// The record with the largest key.
    pub fn last(&self) -> Option<NodeId> {
        rbtree::last(&self.arena, &self.root)
    }

    /// The record after `id` in sort order.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?;
        rbtree::next(&self.arena, id)
    }

    /// The record before `id` in sort order.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?;
        rbtree::prev(&self.arena, id)
    }

    /// Records in sort order.
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            inner: Nodes::new(&self.arena, &self.root),
        }
    }

    /// Handles in sort order.
    pub fn ids(&self) -> Ids<'_, T, A> {
        Ids {
            inner: Nodes::new(&self.arena, &self.root),
        }
    }

    /// Puts `record` into the position of `victim` without rebalancing and
    /// returns the handle of `record` and the record it displaced.
    ///
    /// `record` must order exactly like the record at `victim`; this is not
    /// checked.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `victim` is not a live record,
    /// [`Error::AlreadyLinked`] if `record` claims to be linked, or
    /// [`Error::Alloc`]; the record comes back inside the [`InsertError`].
    pub fn replace(&mut self, victim: NodeId, record: T) -> Result<(NodeId, T), InsertError<T>> {
        if !self.arena.contains(victim) {
            return Err(InsertError {
                error: Error::NotFound,
                record,
            });
        }
        if record.links().is_linked() {
            return Err(InsertError {
                error: Error::AlreadyLinked,
                record,
            });
        }
        if let Err(error) = self.arena.reserve() {
            return Err(InsertError { error, record });
        }

        let id = self.arena.insert_reserved(record);
        if let Err(error) = rbtree::replace_node(&mut self.arena, &mut self.root, victim, id) {
            let record = self.arena.take(id);
            return Err(InsertError { error, record });
        }

        let old = self.arena.take(victim);
        log::trace!("replaced record {victim} with {id}");
        Ok((id, old))
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        log::debug!("clearing tree of {} records", self.arena.len());
        self.root.clear();
        self.arena.clear();
    }

    /// Verifies the tree's invariants, ordering records with `cmp`.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn check_by<F>(&self, cmp: F) -> Result<Report, Violation<NodeId>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        rbtree::check(&self.arena, &self.root, cmp)
    }
}

impl<T: Keyed + Linked<NodeId>, A: Allocator> RbTree<T, A> {
    /// Inserts `record` under its own key.
    ///
    /// # Errors
    ///
    /// See [`insert_by`](Self::insert_by).
    pub fn insert(&mut self, record: T) -> Result<NodeId, InsertError<T>> {
        self.insert_by(record, |new, existing| new.key().cmp(existing.key()))
    }

    /// Returns the handle of the record with `key`.
    pub fn find(&self, key: &T::Key) -> Option<NodeId> {
        self.search_by(|existing| key.cmp(existing.key()))
    }

    /// Returns the record with `key`.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.find(key).and_then(|id| self.arena.get(id))
    }

    /// Returns the record with `key` for payload updates.
    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        let id = self.find(key)?;
        self.arena.get_mut(id)
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.find(key).is_some()
    }

    /// Removes the record with `key` and returns it.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.remove_by(|existing| key.cmp(existing.key()))
    }

    /// Verifies the tree's invariants under the records' own keys.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn check(&self) -> Result<Report, Violation<NodeId>> {
        self.check_by(|a, b| a.key().cmp(b.key()))
    }
}

#[cfg(feature = "std")]
impl<T: Keyed + Linked<NodeId>, A: Allocator> RbTree<T, A>
where
    T::Key: fmt::Debug,
{
    /// Renders the tree as a Graphviz digraph.
    ///
    /// # Errors
    ///
    /// Fails only if formatting a key fails.
    pub fn to_dot(&self) -> Result<String, Box<dyn StdError>> {
        use crate::links::Color;

        let mut data = Vec::default();

        data.write_all(b"digraph G {\n")?;
        data.write_all(b"node [style=filled, fontcolor=white];\n")?;
        for id in self.ids() {
            let links = self.arena.get(id).map(|r| *r.links()).ok_or(Error::NotFound)?;
            let key = self.arena.get(id).map(|r| r.key()).ok_or(Error::NotFound)?;
            let fill = match links.color() {
                Color::Red => "red",
                Color::Black => "black",
            };
            writeln!(data, "n{} [label=\"{:?}\", fillcolor={}];", id.index(), key, fill)?;
            if let Some(left) = links.left() {
                writeln!(data, "n{} -> n{} [label=\"L\"];", id.index(), left.index())?;
            }
            if let Some(right) = links.right() {
                writeln!(data, "n{} -> n{} [label=\"R\"];", id.index(), right.index())?;
            }
        }
        data.write_all(b"}\n")?;

        Ok(String::from_utf8(data)?)
    }
}

impl<T: Linked<NodeId> + fmt::Debug, A: Allocator> fmt::Debug for RbTree<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'s, T: Linked<NodeId>, A: Allocator> IntoIterator for &'s RbTree<T, A> {
    type IntoIter = Iter<'s, T, A>;
    type Item = &'s T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
