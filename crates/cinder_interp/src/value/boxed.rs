use crate::delegate;
use crate::localscope::LocalScope;
use crate::value::object::{Handle, NamedObject, Object};
use crate::value::Value;

/// A primitive boxed into object form by `toObject` (e.g. the receiver of a
/// `with` over a string, or `Object(5)`).
#[derive(Debug)]
pub struct BoxedPrimitive {
    value: Value,
    obj: NamedObject,
}

impl BoxedPrimitive {
    pub fn with_obj(value: Value, obj: NamedObject) -> Self {
        Self { value, obj }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Object for BoxedPrimitive {
    delegate!(
        obj,
        get_own_property_descriptor,
        set_property,
        define_own_property,
        delete_property,
        set_prototype,
        get_prototype,
        as_any,
        own_keys,
        apply,
    );

    fn class_name(&self) -> &'static str {
        match self.value {
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            _ => "Object",
        }
    }
}

/// Unwraps a boxed primitive back to its value, if `handle` is one.
pub fn unbox(handle: &Handle) -> Option<Value> {
    handle
        .as_any()
        .downcast_ref::<BoxedPrimitive>()
        .map(|b| b.value.clone())
}

pub fn new_boxed(sc: &mut LocalScope<'_>, value: Value) -> Handle {
    let prototype = match value {
        Value::Boolean(_) => sc.statics.boolean_prototype.clone(),
        Value::Number(_) => sc.statics.number_prototype.clone(),
        Value::String(_) => sc.statics.string_prototype.clone(),
        Value::Symbol(_) => sc.statics.symbol_prototype.clone(),
        _ => sc.statics.object_prototype.clone(),
    };
    sc.register(BoxedPrimitive::with_obj(value, NamedObject::with_prototype(prototype)))
}
