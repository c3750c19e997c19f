use rustc_hash::FxHashMap;

use super::object::{PropertyKey, PropertyValue};

/// Insertion-ordered own-property storage.
///
/// Iteration order of own keys is the order properties were first defined,
/// which is what `for…in` and `Object.keys` observe. Deletions leave a
/// tombstone so indices stay stable; the table compacts once tombstones
/// dominate.
#[derive(Debug, Default)]
pub struct PropertyMap {
    entries: Vec<Option<(PropertyKey, PropertyValue)>>,
    index: FxHashMap<PropertyKey, usize>,
    holes: usize,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        let &slot = self.index.get(key)?;
        self.entries[slot].as_ref().map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyValue> {
        let &slot = self.index.get(key)?;
        self.entries[slot].as_mut().map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts or updates. Updating keeps the key's original position.
    pub fn insert(&mut self, key: PropertyKey, value: PropertyValue) {
        match self.index.get(&key) {
            Some(&slot) => {
                self.entries[slot] = Some((key, value));
            }
            None => {
                let slot = self.entries.len();
                self.entries.push(Some((key.clone(), value)));
                self.index.insert(key, slot);
            }
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyValue> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries[slot].take()?;
        self.holes += 1;
        if self.holes > self.entries.len() / 2 {
            self.compact();
        }
        Some(value)
    }

    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        self.holes = 0;
        self.index.clear();
        for (slot, entry) in self.entries.iter().enumerate() {
            let (key, _) = entry.as_ref().unwrap();
            self.index.insert(key.clone(), slot);
        }
    }

    /// Iterates live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyValue)> {
        self.entries.iter().flatten().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.iter().map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::object::PropertyValue;
    use crate::value::Value;
    use cinder_middle::interner::{sym, Symbol};

    fn key(raw: Symbol) -> PropertyKey {
        PropertyKey::String(raw.into())
    }

    #[test]
    fn preserves_insertion_order_across_updates_and_removals() {
        let mut map = PropertyMap::new();
        map.insert(key(sym::NAME), PropertyValue::static_default(Value::number(1.0)));
        map.insert(key(sym::LENGTH), PropertyValue::static_default(Value::number(2.0)));
        map.insert(key(sym::VALUE), PropertyValue::static_default(Value::number(3.0)));

        // Updating an existing key keeps its slot.
        map.insert(key(sym::NAME), PropertyValue::static_default(Value::number(9.0)));

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![key(sym::NAME), key(sym::LENGTH), key(sym::VALUE)]);

        map.remove(&key(sym::LENGTH));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![key(sym::NAME), key(sym::VALUE)]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn compaction_keeps_order() {
        let mut map = PropertyMap::new();
        map.insert(key(sym::NAME), PropertyValue::static_default(Value::number(1.0)));
        map.insert(key(sym::LENGTH), PropertyValue::static_default(Value::number(2.0)));
        map.insert(key(sym::VALUE), PropertyValue::static_default(Value::number(3.0)));
        map.insert(key(sym::STACK), PropertyValue::static_default(Value::number(4.0)));

        map.remove(&key(sym::NAME));
        map.remove(&key(sym::VALUE));
        map.remove(&key(sym::LENGTH));

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![key(sym::STACK)]);
        map.insert(key(sym::NAME), PropertyValue::static_default(Value::number(5.0)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![key(sym::STACK), key(sym::NAME)]);
    }
}
