//! Safe record table that owns its allocator.

use allocated::DropIn;
use allocator_api2::alloc::{Allocator, Global};

use crate::error::Result;
use crate::rbtree::{Report, Violation};

use super::{AllocatedRecordTable, Record, RecordRef, Records};

/// A table of heap-allocated records that owns its allocator.
///
/// Records are freed on [`delete`](Self::delete), [`clear`](Self::clear)
/// and when the table is dropped.
///
/// # Example
///
/// ```
/// use allocated_rbtree::RecordTable;
///
/// #[derive(Default)]
/// struct Session {
///     hits: u64,
/// }
///
/// let mut table = RecordTable::<Session>::new();
/// table.create(7)?.hits += 1;
/// table.create(3)?;
///
/// assert_eq!(table.search(7).map(|s| s.hits), Some(1));
/// let ids: Vec<u32> = table.iter().map(|r| r.id()).collect();
/// assert_eq!(ids, [3, 7]);
///
/// table.delete(7)?;
/// assert!(!table.contains(7));
/// # Ok::<(), allocated_rbtree::Error>(())
/// ```
pub struct RecordTable<T, A: Allocator = Global> {
    alloc: A,
    raw: AllocatedRecordTable<T>,
}

impl<T> RecordTable<T> {
    /// Creates an empty table using the global allocator.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T> Default for RecordTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> Drop for RecordTable<T, A> {
    fn drop(&mut self) {
        // SAFETY: `self.alloc` allocated every record in `self.raw`
        unsafe {
            self.raw.drop_in(&self.alloc);
        }
    }
}

impl<T, A: Allocator> RecordTable<T, A> {
    /// Creates an empty table allocating records from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        RecordTable {
            alloc,
            raw: AllocatedRecordTable::new(),
        }
    }

    /// The allocator records come from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.raw.contains(id)
    }

    /// Returns the record with `id`.
    pub fn search(&self, id: u32) -> Option<&Record<T>> {
        self.raw.search(id)
    }

    /// Returns the payload of the record with `id`.
    pub fn search_mut(&mut self, id: u32) -> Option<&mut T> {
        self.raw.search_mut(id)
    }

    /// Allocates a record for `id` with a default payload and returns the
    /// payload.
    ///
    /// # Errors
    ///
    /// [`Error::Duplicate`](crate::Error::Duplicate) if `id` is taken, or
    /// [`Error::Alloc`](crate::Error::Alloc) if allocation fails. The table
    /// is unchanged either way.
    pub fn create(&mut self, id: u32) -> Result<&mut T>
    where
        T: Default,
    {
        // SAFETY: `self.alloc` was used for every record in `self.raw`
        unsafe { self.raw.create_in(&self.alloc, id) }
    }

    /// Frees the record with `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no record has `id`.
    pub fn delete(&mut self, id: u32) -> Result<()> {
        self.delete_with(id, |_, _| {})
    }

    /// Frees the record with `id` and hands its payload to `hook`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no record has `id`.
    pub fn delete_with<F>(&mut self, id: u32, hook: F) -> Result<()>
    where
        F: FnOnce(u32, T),
    {
        // SAFETY: `self.alloc` was used for every record in `self.raw`
        unsafe { self.raw.delete_in(&self.alloc, id, hook) }
    }

    /// Frees every record.
    pub fn clear(&mut self) {
        self.clear_with(|_, _| {});
    }

    /// Frees every record, handing each id and payload to `hook`.
    pub fn clear_with<F>(&mut self, hook: F)
    where
        F: FnMut(u32, T),
    {
        // SAFETY: `self.alloc` was used for every record in `self.raw`
        unsafe { self.raw.clear_in(&self.alloc, hook) }
    }

    /// Frees the subtree below and including the record with `id`, and
    /// returns how many records went.
    ///
    /// The remaining records stay searchable but are no longer balanced.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no record has `id`.
    pub fn clear_subtree(&mut self, id: u32) -> Result<usize> {
        self.clear_subtree_with(id, |_, _| {})
    }

    /// Like [`clear_subtree`](Self::clear_subtree), handing each freed id
    /// and payload to `hook`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no record has `id`.
    pub fn clear_subtree_with<F>(&mut self, id: u32, hook: F) -> Result<usize>
    where
        F: FnMut(u32, T),
    {
        // SAFETY: `self.alloc` was used for every record in `self.raw`
        unsafe { self.raw.clear_subtree_in(&self.alloc, id, hook) }
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> Records<'_, T> {
        self.raw.iter()
    }

    /// Verifies the tree's invariants.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn check(&self) -> core::result::Result<Report, Violation<RecordRef<T>>> {
        self.raw.check()
    }
}

impl<T: core::fmt::Debug, A: Allocator> core::fmt::Debug for RecordTable<T, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.raw, f)
    }
}

impl<'s, T, A: Allocator> IntoIterator for &'s RecordTable<T, A> {
    type IntoIter = Records<'s, T>;
    type Item = &'s Record<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
