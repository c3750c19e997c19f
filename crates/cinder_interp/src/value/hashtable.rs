use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use super::ops::equality::SameZeroKey;
use super::Value;

/// One entry in the hash table, doubling as a node in the insertion-order
/// linked list.
#[derive(Debug)]
pub struct Entry {
    key: RefCell<Value>,
    value: RefCell<Value>,
    deleted: Cell<bool>,
    /// Forward links are strong so existing iterators keep a path through
    /// deleted nodes.
    next: RefCell<Option<Rc<Entry>>>,
    /// Backward links are weak; deletion drops them so dead nodes are only
    /// reachable from iterators still pointing at them.
    prev: RefCell<Option<Weak<Entry>>>,
}

impl Entry {
    fn new(key: Value, value: Value) -> Rc<Self> {
        Rc::new(Self {
            key: RefCell::new(key),
            value: RefCell::new(value),
            deleted: Cell::new(false),
            next: RefCell::new(None),
            prev: RefCell::new(None),
        })
    }

    fn dummy() -> Rc<Self> {
        let entry = Self::new(Value::undefined(), Value::undefined());
        entry.deleted.set(true);
        entry
    }

    /// Zero out key and value and return the old value.
    fn clear(&self) -> Value {
        self.key.replace(Value::undefined());
        self.deleted.set(true);
        self.value.replace(Value::undefined())
    }
}

/// The insertion-ordered hash table backing script `Map` and `Set`.
///
/// Keys compare with `SameValueZero`. Unlike a fail-fast collection, the
/// table explicitly supports mutation while iterators exist: deletion keeps
/// `next` pointers intact so existing iterators advance past removed
/// entries, and `clear` retires the old list in place so existing iterators
/// continue into entries added afterwards.
#[derive(Debug, Default)]
pub struct OrderedHashtable {
    map: RefCell<FxHashMap<SameZeroKey, Rc<Entry>>>,
    first: RefCell<Option<Rc<Entry>>>,
    last: RefCell<Option<Rc<Entry>>>,
}

impl OrderedHashtable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    pub fn put(&self, key: Value, value: Value) {
        let mut map = self.map.borrow_mut();
        if let Some(existing) = map.get(&SameZeroKey(key.clone())) {
            // Update in place; the entry keeps its list position.
            existing.value.replace(value);
            return;
        }

        let entry = Entry::new(key.clone(), value);
        match self.last.borrow().as_ref() {
            None => {
                *self.first.borrow_mut() = Some(Rc::clone(&entry));
            }
            Some(last) => {
                *entry.prev.borrow_mut() = Some(Rc::downgrade(last));
                *last.next.borrow_mut() = Some(Rc::clone(&entry));
            }
        }
        *self.last.borrow_mut() = Some(Rc::clone(&entry));
        map.insert(SameZeroKey(key), entry);
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let map = self.map.borrow();
        let entry = map.get(&SameZeroKey(key.clone()))?;
        let value = entry.value.borrow().clone();
        Some(value)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.map.borrow().contains_key(&SameZeroKey(key.clone()))
    }

    pub fn delete(&self, key: &Value) -> Option<Value> {
        let entry = self.map.borrow_mut().remove(&SameZeroKey(key.clone()))?;

        // Unlink `prev` pointers but leave `next` intact: existing
        // iterators keep advancing in insertion order, new iterators never
        // see the node.
        let is_first = self
            .first
            .borrow()
            .as_ref()
            .is_some_and(|first| Rc::ptr_eq(first, &entry));

        if is_first {
            let is_last = self
                .last
                .borrow()
                .as_ref()
                .is_some_and(|last| Rc::ptr_eq(last, &entry));
            if is_last {
                // Removing the only element: keep it as a dummy, or
                // existing iterators would never stop.
                entry.prev.replace(None);
            } else {
                let next = entry.next.borrow().clone();
                if let Some(next) = &next {
                    next.prev.replace(None);
                }
                *self.first.borrow_mut() = next;
            }
        } else {
            let prev = entry.prev.borrow().clone().and_then(|weak| weak.upgrade());
            if let Some(prev) = &prev {
                *prev.next.borrow_mut() = entry.next.borrow().clone();
            }
            entry.prev.replace(None);
            match entry.next.borrow().as_ref() {
                Some(next) => {
                    next.prev.replace(prev.map(|p| Rc::downgrade(&p)));
                }
                None => {
                    *self.last.borrow_mut() = prev;
                }
            }
        }

        Some(entry.clear())
    }

    pub fn clear(&self) {
        // Zero out all entries so existing iterators skip them, then hang a
        // fresh dummy off the old tail: iterators that run past the retired
        // list drive straight into whatever is inserted next.
        let mut cursor = self.first.borrow().clone();
        while let Some(entry) = cursor {
            entry.clear();
            cursor = entry.next.borrow().clone();
        }

        if self.first.borrow().is_some() {
            let dummy = Entry::dummy();
            if let Some(last) = self.last.borrow().as_ref() {
                *last.next.borrow_mut() = Some(Rc::clone(&dummy));
            }
            *self.first.borrow_mut() = Some(Rc::clone(&dummy));
            *self.last.borrow_mut() = Some(dummy);
        }

        self.map.borrow_mut().clear();
    }

    pub fn iter(&self) -> Iter {
        Iter::new(self.first.borrow().clone())
    }
}

/// An iterator over the linked list. Holds its position by reference, so it
/// stays valid across deletions and clears.
#[derive(Debug)]
pub struct Iter {
    /// A dummy node sitting just before the next entry to yield.
    pos: Rc<Entry>,
}

impl Iter {
    fn new(start: Option<Rc<Entry>>) -> Self {
        let dummy = Entry::dummy();
        *dummy.next.borrow_mut() = start;
        Self { pos: dummy }
    }

    /// Skip forward past deleted elements, which can appear after a
    /// `delete` or `clear` performed while this iterator exists.
    fn skip_deleted(&mut self) {
        loop {
            let next = self.pos.next.borrow().clone();
            match next {
                Some(next) if next.deleted.get() => self.pos = next,
                _ => return,
            }
        }
    }
}

impl Iterator for Iter {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<(Value, Value)> {
        self.skip_deleted();
        let next = self.pos.next.borrow().clone()?;
        let pair = (next.key.borrow().clone(), next.value.borrow().clone());
        self.pos = next;
        Some(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::number(n)
    }

    #[test]
    fn iterates_in_insertion_order() {
        let table = OrderedHashtable::new();
        table.put(num(1.0), num(10.0));
        table.put(num(2.0), num(20.0));
        table.put(num(3.0), num(30.0));
        table.put(num(2.0), num(21.0)); // update keeps position

        let keys: Vec<f64> = table
            .iter()
            .map(|(k, _)| match k {
                Value::Number(n) => n,
                _ => panic!(),
            })
            .collect();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
        assert_eq!(table.get(&num(2.0)), Some(num(21.0)));
    }

    #[test]
    fn iterators_survive_deletion() {
        let table = OrderedHashtable::new();
        table.put(num(1.0), num(1.0));
        table.put(num(2.0), num(2.0));
        table.put(num(3.0), num(3.0));

        let mut iter = table.iter();
        assert_eq!(iter.next().map(|(k, _)| k), Some(num(1.0)));

        table.delete(&num(2.0));

        // The iterator continues forward, skipping the deleted entry.
        assert_eq!(iter.next().map(|(k, _)| k), Some(num(3.0)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn deleting_every_second_entry_mid_iteration() {
        let table = OrderedHashtable::new();
        for i in 0..6 {
            table.put(num(i as f64), num(i as f64));
        }

        let iter = table.iter();
        for i in [1.0, 3.0, 5.0] {
            table.delete(&num(i));
        }

        let keys: Vec<f64> = iter
            .map(|(k, _)| match k {
                Value::Number(n) => n,
                _ => panic!(),
            })
            .collect();
        assert_eq!(keys, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn iterators_survive_clear_and_see_new_entries() {
        let table = OrderedHashtable::new();
        table.put(num(1.0), num(1.0));
        table.put(num(2.0), num(2.0));

        let mut iter = table.iter();
        assert_eq!(iter.next().map(|(k, _)| k), Some(num(1.0)));

        table.clear();
        assert_eq!(table.len(), 0);

        // Entries added after the clear are reached by the old iterator.
        table.put(num(9.0), num(9.0));
        assert_eq!(iter.next().map(|(k, _)| k), Some(num(9.0)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn same_zero_keying() {
        let table = OrderedHashtable::new();
        table.put(num(0.0), num(1.0));
        assert_eq!(table.get(&num(-0.0)), Some(num(1.0)));

        table.put(num(f64::NAN), num(2.0));
        assert_eq!(table.get(&num(f64::NAN)), Some(num(2.0)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn delete_only_element_leaves_working_iterators() {
        let table = OrderedHashtable::new();
        table.put(num(1.0), num(1.0));
        let mut iter = table.iter();
        table.delete(&num(1.0));
        assert_eq!(iter.next(), None);

        table.put(num(2.0), num(2.0));
        let keys: Vec<Value> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![num(2.0)]);
    }
}
