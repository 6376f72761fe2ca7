//! Index-addressed storage for caller records.

use core::fmt;

use allocator_api2::alloc::{Allocator, Global, Layout};
use allocator_api2::vec::Vec;

use crate::error::{Error, Result};
use crate::links::{Linked, Links, NodeStore};

/// Stable handle of a record in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the record in its arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<u32> },
}

/// A growable table of records addressed by [`NodeId`].
///
/// Freed slots are reused before the table grows. Handles stay valid until
/// their record is removed.
pub struct Arena<T, A: Allocator = Global> {
    slots: Vec<Slot<T>, A>,
    next_free: Option<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena using the global allocator.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> Arena<T, A> {
    /// Creates an empty arena that allocates from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Arena {
            slots: Vec::new_in(alloc),
            next_free: None,
            len: 0,
        }
    }

    /// Returns the number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` addresses a live record.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Makes sure the next [`insert`](Self::insert) does not need to grow.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the table cannot grow.
    pub fn reserve(&mut self) -> Result<()> {
        if self.next_free.is_some() || self.slots.len() < self.slots.capacity() {
            return Ok(());
        }

        let layout = Layout::new::<Slot<T>>();
        if u32::try_from(self.slots.len()).is_err() {
            return Err(Error::Alloc(layout.into()));
        }
        let len = self.slots.len();
        self.slots.try_reserve(1).map_err(|_| {
            log::warn!("arena could not grow past {len} slots");
            Error::Alloc(layout.into())
        })
    }

    /// Stores `value` and returns its handle.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the table cannot grow. `value` is dropped.
    pub fn insert(&mut self, value: T) -> Result<NodeId> {
        self.reserve()?;
        Ok(self.insert_reserved(value))
    }

    /// Stores `value` in room made by a successful [`reserve`](Self::reserve).
    pub(crate) fn insert_reserved(&mut self, value: T) -> NodeId {
        if let Some(index) = self.next_free {
            if let Some(Slot::Vacant { next_free }) = self.slots.get(index as usize) {
                self.next_free = *next_free;
                self.slots[index as usize] = Slot::Occupied(value);
                self.len += 1;
                return NodeId(index);
            }
            self.next_free = None;
        }

        let index = NodeId(self.slots.len() as u32);
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        index
    }

    /// Moves the record at `id` out, whatever its links say.
    ///
    /// # Panics
    ///
    /// If `id` does not address a live record.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        self.occupied(id);
        let vacant = Slot::Vacant {
            next_free: self.next_free,
        };
        match core::mem::replace(&mut self.slots[id.index()], vacant) {
            Slot::Occupied(value) => {
                self.next_free = Some(id.0);
                self.len -= 1;
                value
            }
            Slot::Vacant { .. } => unreachable!("slot {id} checked occupied"),
        }
    }

    /// Drops every record. Handles handed out so far become dangling.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_free = None;
        self.len = 0;
    }

    fn occupied(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("node handle {id} does not address a live record"),
        }
    }

    fn occupied_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("node handle {id} does not address a live record"),
        }
    }
}

impl<T: Linked<NodeId>, A: Allocator> Arena<T, A> {
    /// Removes the record at `id` and returns it.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `id` does not address a live record.
    /// - [`Error::AlreadyLinked`] if the record is still in a tree; erase it
    ///   first.
    pub fn remove(&mut self, id: NodeId) -> Result<T> {
        let value = self.get(id).ok_or(Error::NotFound)?;
        if value.links().is_linked() {
            return Err(Error::AlreadyLinked);
        }

        Ok(self.take(id))
    }
}

/// # Panics
///
/// Resolving a [`NodeId`] that does not address a live record panics.
impl<T: Linked<NodeId>, A: Allocator> NodeStore for Arena<T, A> {
    type Node = NodeId;
    type Record = T;

    #[inline]
    fn record(&self, node: NodeId) -> &T {
        self.occupied(node)
    }

    #[inline]
    fn links(&self, node: NodeId) -> &Links<NodeId> {
        self.occupied(node).links()
    }

    #[inline]
    fn links_mut(&mut self, node: NodeId) -> &mut Links<NodeId> {
        self.occupied_mut(node).links_mut()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Arena<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
                Slot::Occupied(value) => Some((NodeId(i as u32), value)),
                Slot::Vacant { .. } => None,
            }))
            .finish()
    }
}
