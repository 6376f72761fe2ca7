use core::iter::FusedIterator;

use allocator_api2::alloc::Allocator;

use crate::arena::{Arena, NodeId};
use crate::links::{Linked, NodeStore};
use crate::rbtree::Nodes;

/// Records of an [`RbTree`](super::RbTree) in sort order.
pub struct Iter<'s, T: Linked<NodeId>, A: Allocator> {
    pub(super) inner: Nodes<'s, Arena<T, A>>,
}

impl<'s, T: Linked<NodeId>, A: Allocator> Iterator for Iter<'s, T, A> {
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.next()?;
        Some(self.inner.store().record(id))
    }
}

impl<T: Linked<NodeId>, A: Allocator> DoubleEndedIterator for Iter<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.inner.next_back()?;
        Some(self.inner.store().record(id))
    }
}

impl<T: Linked<NodeId>, A: Allocator> FusedIterator for Iter<'_, T, A> {}

impl<T: Linked<NodeId>, A: Allocator> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// Handles of an [`RbTree`](super::RbTree) in sort order.
pub struct Ids<'s, T: Linked<NodeId>, A: Allocator> {
    pub(super) inner: Nodes<'s, Arena<T, A>>,
}

impl<T: Linked<NodeId>, A: Allocator> Iterator for Ids<'_, T, A> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T: Linked<NodeId>, A: Allocator> DoubleEndedIterator for Ids<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T: Linked<NodeId>, A: Allocator> FusedIterator for Ids<'_, T, A> {}
