extern crate alloc;
use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use core::result::Result;
use std::error::Error;

use allocated::CountingAllocator;
use itertools::assert_equal;

use crate::testing::{assert_released, LimitedAllocator};
use crate::error::Error as TreeError;
use crate::links::Links;

use super::*;

#[derive(Debug)]
struct Entry {
    links: Links<NodeId>,
    key: u32,
    value: &'static str,
}

impl Linked<NodeId> for Entry {
    fn links(&self) -> &Links<NodeId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<NodeId> {
        &mut self.links
    }
}

impl Keyed for Entry {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.key
    }
}

fn entry(key: u32, value: &'static str) -> Entry {
    Entry {
        links: Links::new(),
        key,
        value,
    }
}

fn sample() -> Result<RbTree<Entry>, Box<dyn Error>> {
    let mut tree = RbTree::new();
    for (key, value) in [
        (5, "five"),
        (3, "three"),
        (8, "eight"),
        (1, "one"),
        (4, "four"),
        (7, "seven"),
        (9, "nine"),
    ] {
        tree.insert(entry(key, value))?;
    }
    Ok(tree)
}

#[test]
fn test_constructor() -> Result<(), Box<dyn Error>> {
    let tree = RbTree::<Entry>::new();

    assert_eq!(tree.len(), 0);
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    assert_eq!(tree.first(), None);
    assert_eq!(tree.last(), None);
    assert_eq!(tree.get(&1).map(|e| e.value), None);
    assert_eq!(tree.iter().count(), 0);
    tree.check()?;

    Ok(())
}

#[test]
fn test_insert_and_get() -> Result<(), Box<dyn Error>> {
    let tree = sample()?;

    assert_eq!(tree.len(), 7);
    assert!(!tree.is_empty());
    assert_equal(tree.iter().map(|e| e.key), [1, 3, 4, 5, 7, 8, 9]);
    assert_equal(tree.iter().rev().map(|e| e.key), [9, 8, 7, 5, 4, 3, 1]);
    assert_eq!(tree.get(&4).map(|e| e.value), Some("four"));
    assert_eq!(tree.get(&6).map(|e| e.value), None);
    assert!(tree.contains_key(&9));
    assert!(!tree.contains_key(&10));
    tree.check()?;

    Ok(())
}

#[test]
fn test_into_iter() -> Result<(), Box<dyn Error>> {
    let tree = sample()?;

    let mut keys = Vec::new();
    for e in &tree {
        keys.push(e.key);
    }
    assert_equal(keys, [1, 3, 4, 5, 7, 8, 9]);

    Ok(())
}

#[test]
fn test_duplicate_returns_record() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;

    let err = match tree.insert(entry(3, "again")) {
        Ok(id) => return Err(format!("duplicate accepted as {id}").into()),
        Err(err) => err,
    };
    assert_eq!(err.error(), TreeError::Duplicate);
    let record = err.into_record();
    assert_eq!(record.value, "again");
    assert!(!record.links.is_linked());

    assert_eq!(tree.len(), 7);
    assert_eq!(tree.get(&3).map(|e| e.value), Some("three"));
    tree.check()?;

    Ok(())
}

#[test]
fn test_linked_record_rejected() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;
    let mut record = entry(100, "stray");
    record.links.link(None);

    let err = tree
        .insert(record)
        .err()
        .ok_or("linked record accepted")?;
    assert_eq!(err.error(), TreeError::AlreadyLinked);
    assert_eq!(tree.len(), 7);

    Ok(())
}

#[test]
fn test_remove() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;

    let removed = tree.remove(&5).ok_or("missing key")?;
    assert_eq!(removed.value, "five");
    assert!(!removed.links.is_linked());
    assert_eq!(tree.remove(&5).map(|e| e.key), None);
    assert_eq!(tree.len(), 6);
    assert_equal(tree.iter().map(|e| e.key), [1, 3, 4, 7, 8, 9]);
    tree.check()?;

    for key in [1, 3, 4, 7, 8, 9] {
        assert_eq!(tree.remove(&key).map(|e| e.key), Some(key));
        tree.check()?;
    }
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);

    Ok(())
}

#[test]
fn test_remove_id() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;
    let id = tree.find(&8).ok_or("missing key")?;

    assert_eq!(tree.remove_id(id).map(|e| e.value), Some("eight"));
    assert_eq!(tree.remove_id(id).map(|e| e.value), None);
    assert_eq!(tree.get_id(id).map(|e| e.value), None);
    tree.check()?;

    Ok(())
}

#[test]
fn test_slot_reuse() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;
    let id = tree.find(&4).ok_or("missing key")?;
    tree.remove(&4).ok_or("missing key")?;

    let reused = tree.insert(entry(6, "six"))?;
    assert_eq!(reused, id);
    assert_eq!(tree.get_id(reused).map(|e| e.key), Some(6));
    assert_equal(tree.iter().map(|e| e.key), [1, 3, 5, 6, 7, 8, 9]);
    tree.check()?;

    Ok(())
}

#[test]
fn test_navigation() -> Result<(), Box<dyn Error>> {
    let tree = sample()?;

    let mut keys = Vec::new();
    let mut cursor = tree.first();
    while let Some(id) = cursor {
        keys.push(tree.get_id(id).ok_or("dangling id")?.key);
        cursor = tree.next(id);
    }
    assert_equal(keys, [1, 3, 4, 5, 7, 8, 9]);

    let last = tree.last().ok_or("empty tree")?;
    let before = tree.prev(last).ok_or("no predecessor")?;
    assert_eq!(tree.get_id(before).map(|e| e.key), Some(8));
    assert_equal(tree.ids().rev().take(2), [last, before]);

    Ok(())
}

#[test]
fn test_stale_id_navigation() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;
    let id = tree.find(&7).ok_or("missing key")?;
    tree.remove(&7).ok_or("missing key")?;

    assert_eq!(tree.next(id), None);
    assert_eq!(tree.prev(id), None);

    Ok(())
}

#[test]
fn test_get_mut() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;

    tree.get_mut(&3).ok_or("missing key")?.value = "drei";
    assert_eq!(tree.get(&3).map(|e| e.value), Some("drei"));

    let id = tree.find(&9).ok_or("missing key")?;
    tree.get_id_mut(id).ok_or("dangling id")?.value = "neun";
    assert_eq!(tree.get(&9).map(|e| e.value), Some("neun"));

    Ok(())
}

#[test]
fn test_insert_by_descending() -> Result<(), Box<dyn Error>> {
    let mut tree = RbTree::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        tree.insert_by(entry(key, ""), |new, existing| existing.key.cmp(&new.key))?;
    }

    assert_equal(tree.iter().map(|e| e.key), [9, 8, 7, 5, 4, 3, 1]);
    tree.check_by(|a, b| b.key.cmp(&a.key))?;
    assert!(matches!(tree.check(), Err(Violation::OutOfOrder { .. })));

    let found = tree.search_by(|e| e.key.cmp(&4)).ok_or("missing key")?;
    assert_eq!(tree.get_id(found).map(|e| e.key), Some(4));
    assert_eq!(tree.remove_by(|e| e.key.cmp(&4)).map(|e| e.key), Some(4));

    Ok(())
}

#[test]
fn test_replace() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;
    let victim = tree.find(&5).ok_or("missing key")?;

    let (id, old) = tree.replace(victim, entry(5, "FIVE"))?;
    assert_eq!(old.value, "five");
    assert!(!old.links.is_linked());
    assert_eq!(tree.find(&5), Some(id));
    assert_eq!(tree.get(&5).map(|e| e.value), Some("FIVE"));
    assert_eq!(tree.len(), 7);
    assert_equal(tree.iter().map(|e| e.key), [1, 3, 4, 5, 7, 8, 9]);
    tree.check()?;

    let err = tree
        .replace(victim, entry(5, "stale"))
        .err()
        .ok_or("stale victim accepted")?;
    assert_eq!(err.error(), TreeError::NotFound);
    assert_eq!(err.into_record().value, "stale");

    Ok(())
}

#[test]
fn test_clear() -> Result<(), Box<dyn Error>> {
    let mut tree = sample()?;

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.iter().count(), 0);

    tree.insert(entry(2, "two"))?;
    assert_equal(tree.iter().map(|e| e.key), [2]);
    tree.check()?;

    Ok(())
}

#[test]
fn test_allocations_released() -> Result<(), Box<dyn Error>> {
    let alloc = CountingAllocator::default();
    {
        let mut tree = RbTree::new_in(&alloc);
        for key in 0..100 {
            tree.insert(entry(key, ""))?;
        }
        for key in (0..100).step_by(2) {
            tree.remove(&key).ok_or("missing key")?;
        }
        tree.check()?;
        assert!(alloc.n_allocations() > 0);
    }
    assert_released(&alloc);

    Ok(())
}

#[test]
fn test_allocation_failure() -> Result<(), Box<dyn Error>> {
    let alloc = LimitedAllocator::new(0);
    let mut tree = RbTree::new_in(&alloc);

    let err = tree
        .insert(entry(1, "one"))
        .err()
        .ok_or("insert succeeded without memory")?;
    assert!(matches!(err.error(), TreeError::Alloc(_)));
    assert_eq!(err.into_record().value, "one");
    assert!(tree.is_empty());
    tree.check()?;

    alloc.set_limit(None);
    tree.insert(entry(1, "one"))?;
    assert_eq!(tree.len(), 1);

    Ok(())
}

#[test]
fn test_debug() -> Result<(), Box<dyn Error>> {
    let mut tree = RbTree::new();
    tree.insert(entry(1, "one"))?;

    let rendered = format!("{tree:?}");
    assert!(rendered.starts_with("[Entry {"));
    assert!(rendered.contains("key: 1"));

    Ok(())
}

#[cfg(feature = "std")]
#[test]
fn test_to_dot() -> Result<(), Box<dyn Error>> {
    let tree = sample()?;

    let dot = tree.to_dot()?;
    assert!(dot.starts_with("digraph G {\n"));
    assert!(dot.ends_with("}\n"));
    assert_eq!(dot.matches("fillcolor=").count(), 7);
    assert_eq!(dot.matches(" -> ").count(), 6);
    assert!(dot.contains("label=\"5\", fillcolor=black"));

    Ok(())
}
