//! Heap-allocated records keyed by an integer id.
//!
//! [`AllocatedRecordTable`] allocates one [`Record`] per id, links it into a
//! red-black tree ordered by ascending id, and frees it again on delete or
//! teardown. Like every `Allocated*` type it does not own an allocator: each
//! allocating method takes one, and callers must always pass the same one.
//! [`RecordTable`] owns its allocator and is the safe way in.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::{self, NonNull};

use allocated::{AllocatorExt, DropIn};
use allocator_api2::alloc::Allocator;

use crate::error::{Error, Result};
use crate::keyed;
use crate::links::{Color, LinkOps, Links, NodeStore};
use crate::rbtree::{self, Nodes, Report, Root, Violation};

mod wrapper;

#[cfg(test)]
mod tests;

pub use wrapper::RecordTable;

/// One allocated record: tree links, its id and a caller payload.
///
/// Only the payload is ever handed out mutably. The links and the id belong
/// to the table:
///
/// ```compile_fail
/// use allocated_rbtree::{Linked, RecordRef, RecordTable};
///
/// let mut table = RecordTable::<u64>::new();
/// table.create(1)?;
/// let record = table.search(1).unwrap();
/// let _ = Linked::<RecordRef<u64>>::links(record);
/// # Ok::<(), allocated_rbtree::Error>(())
/// ```
///
/// ```compile_fail
/// use allocated_rbtree::RecordTable;
///
/// let mut a = RecordTable::<u64>::new();
/// let mut b = RecordTable::<u64>::new();
/// a.create(1)?;
/// b.create(2)?;
/// let (x, y) = (a.search_mut(1).unwrap(), b.search_mut(2).unwrap());
/// let _: &mut allocated_rbtree::Record<u64> = x;
/// core::mem::swap(x, y);
/// # Ok::<(), allocated_rbtree::Error>(())
/// ```
pub struct Record<T> {
    links: Links<RecordRef<T>>,
    id: u32,
    payload: T,
}

impl<T> Record<T> {
    /// The key the record is ordered by.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The record's color in the table's tree.
    #[inline]
    pub fn color(&self) -> Color {
        self.links.color()
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.payload
    }
}

impl<T: fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("color", &self.links.color())
            .field("payload", &self.payload)
            .finish()
    }
}

/// Opaque handle of a record inside a record table.
///
/// Handles only show up in diagnostics such as [`Violation`]; they cannot be
/// dereferenced from outside the table.
pub struct RecordRef<T>(NonNull<Record<T>>);

impl<T> Clone for RecordRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RecordRef<T> {}

impl<T> PartialEq for RecordRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for RecordRef<T> {}

impl<T> fmt::Debug for RecordRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordRef({:p})", self.0)
    }
}

/// Resolves [`RecordRef`]s by dereferencing them.
///
/// Invariant: every handle the table passes in points at a live record
/// allocated by the table and not yet freed. All handles come from the
/// table's own tree, so the invariant holds as long as freed records are
/// unlinked from it first.
struct Heap<T>(PhantomData<Record<T>>);

impl<T> NodeStore for Heap<T> {
    type Node = RecordRef<T>;
    type Record = Record<T>;

    #[inline]
    fn record(&self, node: RecordRef<T>) -> &Record<T> {
        // SAFETY: `node` is live (see `Heap`), and the table hands out
        // shared references only while it is borrowed itself.
        unsafe { node.0.as_ref() }
    }

    #[inline]
    fn links(&self, node: RecordRef<T>) -> &Links<RecordRef<T>> {
        &self.record(node).links
    }

    #[inline]
    fn links_mut(&mut self, node: RecordRef<T>) -> &mut Links<RecordRef<T>> {
        // SAFETY: `node` is live, and the engine holds no other borrow of a
        // record while it writes links.
        unsafe { &mut (*node.0.as_ptr()).links }
    }
}

/// A tree of heap-allocated records that does not own its allocator.
///
/// Dropping the table without [`DropIn::drop_in`] leaks every record.
pub struct AllocatedRecordTable<T> {
    heap: Heap<T>,
    root: Root<RecordRef<T>>,
    n: usize,
}

impl<T> AllocatedRecordTable<T> {
    /// Creates an empty table.
    pub const fn new() -> Self {
        AllocatedRecordTable {
            heap: Heap(PhantomData),
            root: Root::new(),
            n: 0,
        }
    }

    /// Returns the number of records in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if the table holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn find(&self, id: u32) -> Option<RecordRef<T>> {
        keyed::search(&self.heap, &self.root, |record| id.cmp(&record.id))
    }

    /// Returns the record with `id`.
    pub fn search(&self, id: u32) -> Option<&Record<T>> {
        self.find(id).map(|node| self.heap.record(node))
    }

    /// Returns the payload of the record with `id`.
    pub fn search_mut(&mut self, id: u32) -> Option<&mut T> {
        let node = self.find(id)?;
        // SAFETY: `node` is live, and `&mut self` rules out other borrows.
        Some(unsafe { &mut (*node.0.as_ptr()).payload })
    }

    pub fn contains(&self, id: u32) -> bool {
        self.find(id).is_some()
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> Records<'_, T> {
        Records {
            inner: Nodes::new(&self.heap, &self.root),
        }
    }

    /// Verifies the tree's invariants.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn check(&self) -> core::result::Result<Report, Violation<RecordRef<T>>> {
        rbtree::check(&self.heap, &self.root, |a, b| a.id.cmp(&b.id))
    }

    /// Allocates a record for `id` with a default payload, links it in and
    /// returns the payload.
    ///
    /// # Errors
    ///
    /// - [`Error::Duplicate`] if `id` is taken. Nothing is allocated.
    /// - [`Error::Alloc`] if the allocator fails. Nothing is linked.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator every other `*_in` call on this table
    /// uses.
    pub unsafe fn create_in<A: Allocator>(&mut self, alloc: &A, id: u32) -> Result<&mut T>
    where
        T: Default,
    {
        let (parent, side) =
            keyed::find_slot(&self.heap, &self.root, |record| id.cmp(&record.id)).inspect_err(
                |error| log::debug!("rejected record {id}: {error}"),
            )?;

        let record = Record {
            links: Links::new(),
            id,
            payload: T::default(),
        };

        let ptr = alloc
            .allocate_from(record)
            .inspect_err(|_| log::warn!("failed to allocate record {id}"))?
            .into_inner();
        let node = RecordRef(ptr);

        if let Err(error) = rbtree::link_node(&mut self.heap, &mut self.root, node, parent, side) {
            // SAFETY: `node` never made it into the tree and came from `alloc`.
            unsafe { Self::free_in(alloc, node, |_, _| {}) };
            return Err(error);
        }
        rbtree::insert_color(&mut self.heap, &mut self.root, node);
        self.n += 1;

        log::trace!("created record {id}");
        // SAFETY: the record is live, and the result borrows `self` mutably.
        Ok(unsafe { &mut (*ptr.as_ptr()).payload })
    }

    /// Unlinks the record with `id`, frees it and hands its id and payload
    /// to `hook`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no record has `id`.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator every other `*_in` call on this table
    /// uses.
    pub unsafe fn delete_in<A, F>(&mut self, alloc: &A, id: u32, hook: F) -> Result<()>
    where
        A: Allocator,
        F: FnOnce(u32, T),
    {
        let node = keyed::delete(&mut self.heap, &mut self.root, |record| id.cmp(&record.id))
            .ok_or(Error::NotFound)?;
        self.n -= 1;

        // SAFETY: `node` is out of the tree and was allocated by `alloc`.
        unsafe { Self::free_in(alloc, node, hook) };
        log::trace!("deleted record {id}");
        Ok(())
    }

    /// Frees every record, children before parents, handing each id and
    /// payload to `hook`.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator every other `*_in` call on this table
    /// uses.
    pub unsafe fn clear_in<A, F>(&mut self, alloc: &A, hook: F)
    where
        A: Allocator,
        F: FnMut(u32, T),
    {
        let top = self.root.node();
        self.root.clear();
        // SAFETY: the tree at `top` is fully detached, and forwarded contract.
        let freed = unsafe { self.teardown_in(alloc, top, hook) };
        self.n = 0;
        log::debug!("cleared {freed} records");
    }

    /// Detaches the subtree rooted at the record with `id` and frees it like
    /// [`clear_in`](Self::clear_in). Returns the number of records freed.
    ///
    /// The records left behind keep their order but the tree is no longer
    /// balanced, so [`check`](Self::check) may fail afterwards. Use this
    /// for teardown.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no record has `id`.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator every other `*_in` call on this table
    /// uses.
    pub unsafe fn clear_subtree_in<A, F>(&mut self, alloc: &A, id: u32, hook: F) -> Result<usize>
    where
        A: Allocator,
        F: FnMut(u32, T),
    {
        let top = self.find(id).ok_or(Error::NotFound)?;
        match self.heap.parent_of(top) {
            Some(parent) => self.detach(parent, top),
            None => self.root.clear(),
        }

        // SAFETY: the subtree is detached, and forwarded contract.
        let freed = unsafe { self.teardown_in(alloc, Some(top), hook) };
        self.n -= freed;
        log::debug!("cleared {freed} records below {id}");
        Ok(freed)
    }

    fn detach(&mut self, parent: RecordRef<T>, child: RecordRef<T>) {
        if self.heap.left_of(parent) == Some(child) {
            self.heap.set_left(parent, None);
        } else {
            self.heap.set_right(parent, None);
        }
    }

    /// Post-order walk over the detached subtree at `top` that frees each
    /// record once both its children are gone. Climbs through parent links,
    /// so it needs neither recursion nor a stack.
    ///
    /// # Safety
    ///
    /// Nothing outside the subtree may point into it, and `alloc` allocated
    /// every record in it.
    unsafe fn teardown_in<A, F>(&mut self, alloc: &A, top: Option<RecordRef<T>>, mut hook: F) -> usize
    where
        A: Allocator,
        F: FnMut(u32, T),
    {
        let Some(top) = top else {
            return 0;
        };

        let mut freed = 0;
        let mut node = top;
        loop {
            if let Some(left) = self.heap.left_of(node) {
                node = left;
                continue;
            }
            if let Some(right) = self.heap.right_of(node) {
                node = right;
                continue;
            }

            let parent = self.heap.parent_of(node).filter(|_| node != top);
            if let Some(parent) = parent {
                self.detach(parent, node);
            }
            self.heap.links_mut(node).unlink();
            // SAFETY: `node` is a leaf no longer reachable from anything.
            unsafe { Self::free_in(alloc, node, &mut hook) };
            freed += 1;

            match parent {
                Some(parent) => node = parent,
                None => return freed,
            }
        }
    }

    /// # Safety
    ///
    /// `node` must be unreachable from the tree and allocated by `alloc`.
    unsafe fn free_in<A, F>(alloc: &A, node: RecordRef<T>, hook: F)
    where
        A: Allocator,
        F: FnOnce(u32, T),
    {
        // SAFETY: the record is live and nothing else refers to it; moving it
        // out leaves nothing behind that needs dropping.
        let Record { id, payload, .. } = unsafe { ptr::read(node.0.as_ptr()) };
        // SAFETY: `node` came from `alloc` as a `Record<T>`.
        unsafe { alloc.deallocate_from(node.0) };
        hook(id, payload);
    }
}

/// Frees every record and leaves the table empty.
impl<T> DropIn for AllocatedRecordTable<T> {
    /// # Safety
    ///
    /// `alloc` must be the allocator every other `*_in` call on this table
    /// uses.
    unsafe fn drop_in<A: Allocator>(&mut self, alloc: &A) {
        // SAFETY: forwarded contract.
        unsafe { self.clear_in(alloc, |_, _| {}) }
    }
}

impl<T> Default for AllocatedRecordTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AllocatedRecordTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Records of a table in ascending id order.
pub struct Records<'s, T> {
    inner: Nodes<'s, Heap<T>>,
}

impl<'s, T> Iterator for Records<'s, T> {
    type Item = &'s Record<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.inner.next()?;
        Some(self.inner.store().record(node))
    }
}

impl<T> DoubleEndedIterator for Records<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.inner.next_back()?;
        Some(self.inner.store().record(node))
    }
}

impl<T> core::iter::FusedIterator for Records<'_, T> {}

impl<'s, T> IntoIterator for &'s AllocatedRecordTable<T> {
    type IntoIter = Records<'s, T>;
    type Item = &'s Record<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
