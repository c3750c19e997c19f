use std::any::Any;
use std::cell::RefCell;

use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::object::{Handle, NamedObject, Object, PropertyKey, PropertyValue, PropertyValueKind};
use crate::value::ops::conversions::ValueConversion;
use crate::value::Value;

/// The script array: dense element storage plus ordinary object behavior
/// for everything that is not an index.
#[derive(Debug)]
pub struct Array {
    items: RefCell<Vec<Value>>,
    obj: NamedObject,
}

impl Array {
    pub fn new(sc: &LocalScope<'_>) -> Self {
        Self::with_items(sc, Vec::new())
    }

    pub fn with_items(sc: &LocalScope<'_>, items: Vec<Value>) -> Self {
        Self {
            items: RefCell::new(items),
            obj: NamedObject::with_prototype(sc.statics.array_prototype.clone()),
        }
    }

    pub fn items(&self) -> &RefCell<Vec<Value>> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Object for Array {
    fn get_own_property_descriptor(
        &self,
        sc: &mut LocalScope<'_>,
        key: PropertyKey,
    ) -> Result<Option<PropertyValue>, Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::LENGTH {
                return Ok(Some(PropertyValue::new(
                    PropertyValueKind::Static(Value::number(self.len() as f64)),
                    crate::value::object::PropertyDataDescriptor::WRITABLE,
                )));
            }
        }

        if let Some(index) = key.array_index(sc) {
            let items = self.items.borrow();
            return Ok(items.get(index).map(|item| PropertyValue::static_default(item.clone())));
        }

        self.obj.get_own_property_descriptor(sc, key)
    }

    fn set_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey, value: PropertyValue) -> Result<(), Value> {
        if let Some(s) = key.as_string() {
            if s.sym() == sym::LENGTH {
                if let PropertyValueKind::Static(len) = &value.kind {
                    let new_len = len.to_length(sc)? as usize;
                    let mut items = self.items.borrow_mut();
                    items.resize(new_len, Value::undefined());
                }
                return Ok(());
            }
        }

        if let Some(index) = key.array_index(sc) {
            if let PropertyValueKind::Static(incoming) = value.kind {
                let mut items = self.items.borrow_mut();
                if index >= items.len() {
                    items.resize(index + 1, Value::undefined());
                }
                items[index] = incoming;
                return Ok(());
            }
        }

        self.obj.set_property(sc, key, value)
    }

    fn delete_property(&self, sc: &mut LocalScope<'_>, key: PropertyKey) -> Result<bool, Value> {
        if let Some(index) = key.array_index(sc) {
            let mut items = self.items.borrow_mut();
            if index < items.len() {
                items[index] = Value::undefined();
            }
            return Ok(true);
        }
        self.obj.delete_property(sc, key)
    }

    fn set_prototype(&self, sc: &mut LocalScope<'_>, value: Value) -> Result<(), Value> {
        self.obj.set_prototype(sc, value)
    }

    fn get_prototype(&self, sc: &mut LocalScope<'_>) -> Result<Value, Value> {
        self.obj.get_prototype(sc)
    }

    fn apply(
        &self,
        sc: &mut LocalScope<'_>,
        _callee: Handle,
        _this: Value,
        _args: Vec<Value>,
    ) -> Result<Value, Value> {
        crate::throw!(sc, TypeError, "Array is not a function")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn own_keys(&self, sc: &mut LocalScope<'_>) -> Result<Vec<Value>, Value> {
        let mut keys = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let sym = sc.intern_usize(index);
            keys.push(Value::string(sym.into()));
        }
        keys.extend(self.obj.own_keys(sc)?);
        Ok(keys)
    }

    fn class_name(&self) -> &'static str {
        "Array"
    }
}

/// Reads index `i` from any array-like value.
pub fn get_index(sc: &mut LocalScope<'_>, target: &Value, index: usize) -> Result<Value, Value> {
    let key = sc.intern_usize(index);
    target.get_property(sc, key.into())
}

/// Writes index `i` on any array-like value.
pub fn set_index(sc: &mut LocalScope<'_>, target: &Value, index: usize, value: Value) -> Result<(), Value> {
    let key = sc.intern_usize(index);
    target.set_property(sc, key.into(), PropertyValue::static_default(value))
}

/// Collects an array-like value into a vector of elements.
pub fn elements_of(sc: &mut LocalScope<'_>, target: &Value) -> Result<Vec<Value>, Value> {
    if let Some(array) = target.downcast_ref::<Array>() {
        return Ok(array.items.borrow().clone());
    }
    let len = target.length_of_array_like(sc)?;
    let mut out = Vec::with_capacity(len);
    for index in 0..len {
        out.push(get_index(sc, target, index)?);
    }
    Ok(out)
}
