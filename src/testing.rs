//! Test-only allocator that can be told to fail.

use core::cell::Cell;
use core::ops::Deref;
use core::ptr::NonNull;

use allocated::CountingAllocator;
use allocator_api2::alloc::{AllocError, Allocator, Global, Layout};

/// A [`CountingAllocator`] that refuses requests once `limit` allocations
/// have succeeded. Refused requests never reach the counter.
pub(crate) struct LimitedAllocator {
    inner: CountingAllocator<Global>,
    limit: Cell<Option<usize>>,
}

impl LimitedAllocator {
    pub(crate) fn new(limit: usize) -> Self {
        LimitedAllocator {
            inner: CountingAllocator::default(),
            limit: Cell::new(Some(limit)),
        }
    }

    pub(crate) fn set_limit(&self, limit: Option<usize>) {
        self.limit.set(limit);
    }
}

impl Deref for LimitedAllocator {
    type Target = CountingAllocator<Global>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

// SAFETY: every request that is not refused is forwarded to `inner`.
unsafe impl Allocator for LimitedAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if self
            .limit
            .get()
            .is_some_and(|limit| self.inner.n_allocations() >= limit)
        {
            return Err(AllocError);
        }
        self.inner.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.deallocate(ptr, layout) }
    }
}

/// Asserts that every allocation made through `alloc` has been released.
pub(crate) fn assert_released(alloc: &CountingAllocator<Global>) {
    assert_eq!(
        alloc.net_allocations(),
        0,
        "{} allocations, {} deallocations",
        alloc.n_allocations(),
        alloc.n_deallocations()
    );
    assert_eq!(alloc.net_bytes_allocated(), 0);
}
