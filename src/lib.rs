//! Intrusive red-black trees with explicit allocator control.
//!
//! The core of this crate is an allocation-free red-black tree engine that
//! links caller-owned records together through a [`Links`] value embedded
//! in each record. Ordering is entirely the caller's business: the engine
//! only ever sees a three-way comparator.
//!
//! # Quick Start
//!
//! ```
//! use allocated_rbtree::{Keyed, Linked, Links, NodeId, RbTree};
//!
//! struct Timer {
//!     links: Links<NodeId>,
//!     deadline: u64,
//! }
//!
//! impl Linked<NodeId> for Timer {
//!     fn links(&self) -> &Links<NodeId> {
//!         &self.links
//!     }
//!
//!     fn links_mut(&mut self) -> &mut Links<NodeId> {
//!         &mut self.links
//!     }
//! }
//!
//! impl Keyed for Timer {
//!     type Key = u64;
//!
//!     fn key(&self) -> &u64 {
//!         &self.deadline
//!     }
//! }
//!
//! let mut timers = RbTree::new();
//! for deadline in [30, 10, 20] {
//!     timers.insert(Timer { links: Links::new(), deadline })?;
//! }
//!
//! let first = timers.first().and_then(|id| timers.get_id(id));
//! assert_eq!(first.map(|t| t.deadline), Some(10));
//! # Ok::<(), allocated_rbtree::Error>(())
//! ```
//!
//! # Layers
//!
//! - [`rbtree`] - the engine: rotations, insert and erase rebalancing,
//!   traversal, node replacement and an invariant checker. Generic over a
//!   [`NodeStore`] that resolves node handles; never allocates.
//! - [`keyed`] - comparator-driven search, insert and delete on top of the
//!   engine.
//! - [`RbTree`] - owns an [`Arena`] of records and its root; safe API.
//! - [`RecordTable`] - heap-allocates one [`Record`] per integer id and
//!   frees it on delete or teardown.
//!
//! # The Allocated Pattern
//!
//! Types that allocate come in two flavours:
//!
//! - [`RecordTable<T, A>`] and [`RbTree<T, A>`] own their allocator and are
//!   safe to use.
//! - [`AllocatedRecordTable<T>`] does not own an allocator; every allocating
//!   method takes one and is `unsafe`, because passing a different
//!   allocator than before is undefined behaviour. It is released with
//!   [`allocated::DropIn`].
//!
//! ```
//! use allocated::DropIn;
//! use allocated_rbtree::AllocatedRecordTable;
//! use allocator_api2::alloc::Global;
//!
//! let mut table = AllocatedRecordTable::<u64>::new();
//!
//! unsafe {
//!     *table.create_in(&Global, 1)? = 42;
//!     assert_eq!(table.search(1).map(|r| *r.payload()), Some(42));
//!     table.drop_in(&Global);
//! }
//! # Ok::<(), allocated_rbtree::Error>(())
//! ```
//!
//! # Features
//!
//! - `std` - enables `RbTree::to_dot` for rendering trees with Graphviz.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(any(feature = "std", test))]
extern crate std;

extern crate alloc;

mod arena;
mod error;
pub mod keyed;
mod links;
pub mod rbtree;
mod record;
mod tree;

#[cfg(test)]
mod testing;

pub use arena::{Arena, NodeId};
pub use error::{Error, Result};
pub use keyed::Keyed;
pub use links::{Color, Linked, Links, NodeStore};
pub use record::{AllocatedRecordTable, Record, RecordRef, RecordTable, Records};
pub use tree::{Ids, InsertError, Iter, RbTree};
