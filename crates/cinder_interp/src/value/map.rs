use crate::delegate;
use crate::localscope::LocalScope;
use crate::value::object::{NamedObject, Object};
use crate::value::Value;

use super::hashtable::{Iter, OrderedHashtable};

/// The script `Map`: insertion-ordered, `SameValueZero`-keyed, with
/// mutation-tolerant iterators.
#[derive(Debug)]
pub struct Map {
    table: OrderedHashtable,
    obj: NamedObject,
}

impl Map {
    pub fn new(sc: &LocalScope<'_>) -> Self {
        Self::with_obj(NamedObject::with_prototype(sc.statics.map_prototype.clone()))
    }

    pub fn with_obj(obj: NamedObject) -> Self {
        Self {
            table: OrderedHashtable::new(),
            obj,
        }
    }

    pub fn set(&self, key: Value, value: Value) {
        self.table.put(key, value);
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.table.get(key)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.table.has(key)
    }

    pub fn delete(&self, key: &Value) -> bool {
        self.table.delete(key).is_some()
    }

    pub fn clear(&self) {
        self.table.clear();
    }

    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn entries(&self) -> Iter {
        self.table.iter()
    }
}

impl Object for Map {
    delegate!(
        obj,
        get_own_property_descriptor,
        get_property,
        get_property_descriptor,
        set_property,
        define_own_property,
        delete_property,
        set_prototype,
        get_prototype,
        as_any,
        apply,
        own_keys,
    );

    fn class_name(&self) -> &'static str {
        "Map"
    }
}
