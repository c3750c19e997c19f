use crate::delegate;
use crate::localscope::LocalScope;
use crate::value::object::{NamedObject, Object};
use crate::value::Value;

use super::hashtable::{Iter, OrderedHashtable};

/// The script `Set`, sharing the `Map` table with values stored as their
/// own keys.
#[derive(Debug)]
pub struct Set {
    table: OrderedHashtable,
    obj: NamedObject,
}

impl Set {
    pub fn new(sc: &LocalScope<'_>) -> Self {
        Self::with_obj(NamedObject::with_prototype(sc.statics.set_prototype.clone()))
    }

    pub fn with_obj(obj: NamedObject) -> Self {
        Self {
            table: OrderedHashtable::new(),
            obj,
        }
    }

    pub fn add(&self, value: Value) {
        self.table.put(value.clone(), value);
    }

    pub fn has(&self, value: &Value) -> bool {
        self.table.has(value)
    }

    pub fn delete(&self, value: &Value) -> bool {
        self.table.delete(value).is_some()
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

impl Object for Set {
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
        "Set"
    }
}
