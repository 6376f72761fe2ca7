extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;

use core::cell::Cell;
use core::result::Result;
use std::error::Error;
use std::rc::Rc;

use proptest::prelude::*;

use allocated::{AllocErrorWithLayout, CountingAllocator, DropIn};
use allocator_api2::alloc::Layout;
use itertools::assert_equal;

use crate::error::Error as TableError;
use crate::links::Color;
use crate::testing::{assert_released, LimitedAllocator};

use super::*;

/// Counts its own drops through a shared counter.
#[derive(Default)]
struct Tracked {
    drops: Option<Rc<Cell<usize>>>,
    value: u64,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.set(drops.get() + 1);
        }
    }
}

fn ids<T>(table: &AllocatedRecordTable<T>) -> Vec<u32> {
    table.iter().map(|r| r.id()).collect()
}

#[test]
fn test_constructor() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    assert_eq!(table.len(), 0);
    assert!(table.is_empty());
    assert!(!table.contains(1));
    assert!(table.search(1).is_none());
    assert_eq!(table.check()?, Report::default());

    unsafe {
        table.drop_in(&alloc);
    }
    assert_eq!(alloc.n_allocations(), 0);

    Ok(())
}

#[test]
fn test_create_and_search() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        for id in [5, 3, 8, 1, 4, 7, 9] {
            let payload = table.create_in(&alloc, id)?;
            assert_eq!(*payload, 0);
            *payload = u64::from(id) * 10;
            assert_eq!(table.search(id).map(|r| r.id()), Some(id));
        }

        assert_eq!(table.len(), 7);
        assert_equal(ids(&table), [1, 3, 4, 5, 7, 8, 9]);
        assert_equal(table.iter().rev().map(|r| r.id()), [9, 8, 7, 5, 4, 3, 1]);
        assert_eq!(table.search(4).map(|r| **r), Some(40));
        assert!(table.search(6).is_none());
        table.check()?;

        *table.search_mut(4).ok_or("missing id")? += 1;
        assert_eq!(table.search(4).map(|r| *r.payload()), Some(41));

        assert_eq!(alloc.n_allocations(), 7);
        assert_eq!(
            alloc.n_bytes_allocated(),
            7 * core::mem::size_of::<Record<u64>>()
        );

        table.drop_in(&alloc);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_duplicate_does_not_allocate() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        table.create_in(&alloc, 3)?;
        let before = alloc.n_allocations();

        let err = table.create_in(&alloc, 3).err().ok_or("duplicate accepted")?;
        assert_eq!(err, TableError::Duplicate);
        assert_eq!(alloc.n_allocations(), before);
        assert_eq!(table.len(), 1);

        table.drop_in(&alloc);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_allocation_failure_links_nothing() -> Result<(), Box<dyn Error>> {
    let alloc = LimitedAllocator::new(2);
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        table.create_in(&alloc, 1)?;
        table.create_in(&alloc, 2)?;

        let err = table.create_in(&alloc, 3).err().ok_or("allocation did not fail")?;
        assert_eq!(
            err,
            TableError::Alloc(AllocErrorWithLayout::from(Layout::new::<Record<u64>>()))
        );
        assert_eq!(table.len(), 2);
        assert!(!table.contains(3));
        assert_equal(ids(&table), [1, 2]);
        table.check()?;

        table.drop_in(&alloc);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_delete() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        for id in 0..32 {
            table.create_in(&alloc, id)?;
        }

        let mut hooked = Vec::new();
        for id in (0..32).rev().step_by(3) {
            table.delete_in(&alloc, id, |id, _| hooked.push(id))?;
            table.check()?;
        }
        assert_equal(hooked.iter().copied(), (0..32u32).rev().step_by(3));
        assert_eq!(table.len(), 32 - hooked.len());
        assert_eq!(alloc.n_deallocations(), hooked.len());

        assert_eq!(table.delete_in(&alloc, 31, |_, _| {}), Err(TableError::NotFound));

        table.drop_in(&alloc);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_clear_runs_hooks_children_first() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        for id in 0..100 {
            table.create_in(&alloc, id)?;
        }
        let top = table.root.node().ok_or("empty root")?;
        let top_id = table.heap.record(top).id();

        let mut order = Vec::new();
        table.clear_in(&alloc, |id, _| order.push(id));

        assert_eq!(order.len(), 100);
        assert_eq!(order.last(), Some(&top_id));
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_equal(sorted, 0..100u32);

        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        table.check()?;
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_clear_subtree() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        for id in 1..=15 {
            table.create_in(&alloc, id)?;
        }
        let top = table.root.node().ok_or("empty root")?;
        let left = table.heap.left_of(top).ok_or("no left subtree")?;
        let left_id = table.heap.record(left).id();
        let top_id = table.heap.record(top).id();

        let mut freed_ids = Vec::new();
        let freed = table.clear_subtree_in(&alloc, left_id, |id, _| freed_ids.push(id))?;

        assert_eq!(freed, freed_ids.len());
        assert!(freed_ids.iter().all(|&id| id < top_id));
        assert_eq!(freed_ids.last(), Some(&left_id));
        assert_eq!(table.len(), 15 - freed);
        assert_eq!(alloc.n_deallocations(), freed);

        // what is left keeps its order and stays searchable
        let rest = ids(&table);
        assert_eq!(rest.len(), table.len());
        assert!(rest.windows(2).all(|w| w[0] < w[1]));
        assert!(table.contains(top_id));
        assert!(!table.contains(left_id));

        assert_eq!(
            table.clear_subtree_in(&alloc, left_id, |_, _| {}),
            Err(TableError::NotFound)
        );

        table.drop_in(&alloc);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_clear_subtree_at_root() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    let mut table = AllocatedRecordTable::<u64>::new();

    unsafe {
        for id in [4, 2, 6] {
            table.create_in(&alloc, id)?;
        }
        assert_eq!(table.clear_subtree_in(&alloc, 4, |_, _| {})?, 3);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_payload_dropped_once() -> Result<(), Box<dyn Error>> {
    let drops = Rc::new(Cell::new(0));
    let alloc = CountingAllocator::default();
    {
        let mut table = RecordTable::<Tracked, _>::new_in(&alloc);
        for id in 0..10 {
            let record = table.create(id)?;
            record.drops = Some(Rc::clone(&drops));
            record.value = u64::from(id);
        }

        let mut seen = 0;
        table.delete_with(3, |id, payload| {
            assert_eq!(id, 3);
            assert_eq!(payload.value, 3);
            seen += 1;
        })?;
        assert_eq!(seen, 1);
        assert_eq!(drops.get(), 1);

        table.clear_subtree(0)?;
        assert_eq!(drops.get(), 1 + (10 - 1 - table.len()));
    }
    assert_eq!(drops.get(), 10);
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_wrapper() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    {
        let mut table: RecordTable<Tracked, _> = RecordTable::new_in(&alloc);
        table.create(2)?.value = 20;
        table.create(1)?.value = 10;

        assert_eq!(table.len(), 2);
        assert!(table.contains(1));
        assert_eq!(table.search(2).map(|r| r.value), Some(20));
        table.search_mut(1).ok_or("missing id")?.value += 1;
        assert_equal(table.iter().map(|r| r.value), [11, 20]);
        assert_eq!(table.create(2).err(), Some(TableError::Duplicate));
        assert_eq!(table.delete(3), Err(TableError::NotFound));
        table.check()?;

        let mut cleared = 0;
        table.clear_with(|_, _| cleared += 1);
        assert_eq!(cleared, 2);
        assert!(table.is_empty());
        assert_eq!(table.allocator().net_allocations(), 0);

        table.create(5)?;
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_payload_is_the_only_mutable_part() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    {
        let mut a = RecordTable::<u64, _>::new_in(&alloc);
        let mut b = RecordTable::<u64, _>::new_in(&alloc);
        *a.create(1)? = 100;
        for id in [10, 20, 30] {
            *b.create(id)? = u64::from(id);
        }

        assert_eq!(b.search(20).map(|r| r.color()), Some(Color::Black));
        assert_eq!(b.search(10).map(|r| r.color()), Some(Color::Red));

        // payloads move, links stay with their tables
        core::mem::swap(
            a.search_mut(1).ok_or("missing id")?,
            b.search_mut(20).ok_or("missing id")?,
        );

        assert_equal(a.iter().map(|r| (r.id(), **r)), [(1, 20)]);
        assert_equal(b.iter().map(|r| (r.id(), **r)), [(10, 10), (20, 100), (30, 30)]);
        a.check()?;
        b.check()?;

        drop(b);
        assert_equal(a.iter().map(|r| r.id()), [1]);
        assert_eq!(alloc.net_allocations(), 1);
    }
    assert_released(&alloc);

    Ok(())
}

proptest! {
    #[test]
    fn random_create_delete(ops in proptest::collection::vec((any::<bool>(), 0u32..64), 1..300)) {
        let alloc = CountingAllocator::default();
        let mut model = std::collections::BTreeSet::new();
        {
            let mut table = RecordTable::<u64, _>::new_in(&alloc);
            for (create, id) in ops {
                if create {
                    let created = table.create(id).is_ok();
                    prop_assert_eq!(created, model.insert(id));
                } else {
                    let deleted = table.delete(id).is_ok();
                    prop_assert_eq!(deleted, model.remove(&id));
                }
                prop_assert!(table.check().is_ok());
                prop_assert_eq!(table.len(), model.len());
            }
            let ids: Vec<u32> = table.iter().map(|r| r.id()).collect();
            prop_assert_eq!(ids, model.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(alloc.net_allocations(), model.len());
        }
        prop_assert_eq!(alloc.net_allocations(), 0);
    }
}
