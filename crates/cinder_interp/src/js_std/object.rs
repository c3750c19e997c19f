use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::Array;
use crate::value::function::CallContext;
use crate::value::object::{
    Handle, IntegrityLevel, NamedObject, Object, PropertyDataDescriptor, PropertyKey, PropertyValue,
};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.object_prototype.clone();
    register_fn(sc, &prototype, sym::TO_STRING, to_string);
    register_fn(sc, &prototype, sym::VALUE_OF, value_of);
    register_fn(sc, &prototype, sym::HAS_OWN_PROPERTY, has_own_property);

    let ctor = register_ctor(sc, global, sym::OBJECT, constructor, &prototype);
    for (name, fun) in [
        ("keys", keys as crate::value::function::NativeFunction),
        ("values", values),
        ("entries", entries),
        ("assign", assign),
        ("create", create),
        ("freeze", freeze),
        ("seal", seal),
        ("isFrozen", is_frozen),
        ("isSealed", is_sealed),
        ("preventExtensions", prevent_extensions),
        ("isExtensible", is_extensible),
        ("defineProperty", define_property),
        ("getOwnPropertyDescriptor", get_own_property_descriptor),
        ("getPrototypeOf", get_prototype_of),
        ("setPrototypeOf", set_prototype_of),
    ] {
        let name = sc.intern(name);
        register_fn(sc, &ctor, name, fun);
    }
}

fn this_object(cx: &mut CallContext<'_, '_>, name: &str) -> Result<Handle, Value> {
    match cx.this.as_object() {
        Some(handle) => Ok(handle.clone()),
        None => throw!(cx.scope, TypeError, "{} called on non-object", name),
    }
}

fn arg_object(cx: &mut CallContext<'_, '_>, index: usize, name: &str) -> Result<Handle, Value> {
    match cx.args.get(index).and_then(Value::as_object) {
        Some(handle) => Ok(handle.clone()),
        None => throw!(cx.scope, TypeError, "{} called on non-object", name),
    }
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    match cx.args.first() {
        Some(value) if !value.is_nullish() => {
            let handle = value.to_object(cx.scope)?;
            Ok(Value::Object(handle))
        }
        _ => {
            let obj = NamedObject::new(cx.scope);
            Ok(Value::Object(cx.scope.register(obj)))
        }
    }
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let name = match &cx.this {
        Value::Object(handle) => handle.class_name(),
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        other => other.kind_name(),
    };
    let text = format!("[object {name}]");
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

pub fn value_of(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(cx.this.clone())
}

pub fn has_own_property(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let key = cx.args.first().unwrap_or_undefined();
    let key = PropertyKey::from_value(cx.scope, key)?;
    let this = this_object(&mut cx, "Object.prototype.hasOwnProperty")?;
    let found = this.get_own_property_descriptor(cx.scope, key)?;
    Ok(Value::boolean(found.is_some()))
}

/// Own enumerable string keys, in insertion order.
fn enumerable_keys(sc: &mut LocalScope<'_>, handle: &Handle) -> Result<Vec<PropertyKey>, Value> {
    let keys = handle.own_keys(sc)?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        if let Value::String(_) = key {
            let key = PropertyKey::from_value(sc, key)?;
            if let Some(desc) = handle.get_own_property_descriptor(sc, key.clone())? {
                if desc.descriptor.contains(PropertyDataDescriptor::ENUMERABLE) {
                    out.push(key);
                }
            }
        }
    }
    Ok(out)
}

pub fn keys(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.keys")?;
    let keys = enumerable_keys(cx.scope, &target)?;
    let items = keys.iter().map(PropertyKey::as_value).collect();
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn values(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.values")?;
    let keys = enumerable_keys(cx.scope, &target)?;
    let mut items = Vec::with_capacity(keys.len());
    for key in keys {
        items.push(target.get_property(cx.scope, key)?);
    }
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn entries(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.entries")?;
    let keys = enumerable_keys(cx.scope, &target)?;
    let mut items = Vec::with_capacity(keys.len());
    for key in keys {
        let value = target.get_property(cx.scope, key.clone())?;
        let pair = Array::with_items(cx.scope, vec![key.as_value(), value]);
        items.push(Value::Object(cx.scope.register(pair)));
    }
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn assign(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.assign")?;
    for source in cx.args.iter().skip(1).cloned().collect::<Vec<_>>() {
        let Value::Object(source) = source else { continue };
        let keys = enumerable_keys(cx.scope, &source)?;
        for key in keys {
            let value = source.get_property(cx.scope, key.clone())?;
            target.set_property(cx.scope, key, PropertyValue::static_default(value))?;
        }
    }
    Ok(Value::Object(target))
}

pub fn create(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let object = match cx.args.first() {
        Some(Value::Object(proto)) => NamedObject::with_prototype(proto.clone()),
        Some(Value::Null) => NamedObject::null(),
        _ => throw!(cx.scope, TypeError, "Object prototype may only be an Object or null"),
    };
    Ok(Value::Object(cx.scope.register(object)))
}

pub fn freeze(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    if let Ok(target) = this_or_arg_object(&mut cx) {
        target.set_integrity_level(cx.scope, IntegrityLevel::Frozen)?;
    }
    Ok(cx.args.first().unwrap_or_undefined())
}

pub fn seal(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    if let Ok(target) = this_or_arg_object(&mut cx) {
        target.set_integrity_level(cx.scope, IntegrityLevel::Sealed)?;
    }
    Ok(cx.args.first().unwrap_or_undefined())
}

fn this_or_arg_object(cx: &mut CallContext<'_, '_>) -> Result<Handle, Value> {
    match cx.args.first().and_then(Value::as_object) {
        Some(handle) => Ok(handle.clone()),
        None => Err(Value::undefined()),
    }
}

pub fn is_frozen(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    match this_or_arg_object(&mut cx) {
        Ok(target) => {
            let frozen = target.test_integrity_level(cx.scope, IntegrityLevel::Frozen)?;
            Ok(Value::boolean(frozen))
        }
        Err(_) => Ok(Value::boolean(true)),
    }
}

pub fn is_sealed(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    match this_or_arg_object(&mut cx) {
        Ok(target) => {
            let sealed = target.test_integrity_level(cx.scope, IntegrityLevel::Sealed)?;
            Ok(Value::boolean(sealed))
        }
        Err(_) => Ok(Value::boolean(true)),
    }
}

pub fn prevent_extensions(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    if let Ok(target) = this_or_arg_object(&mut cx) {
        target.prevent_extensions();
    }
    Ok(cx.args.first().unwrap_or_undefined())
}

pub fn is_extensible(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    match this_or_arg_object(&mut cx) {
        Ok(target) => Ok(Value::boolean(target.is_extensible())),
        Err(_) => Ok(Value::boolean(false)),
    }
}

pub fn define_property(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.defineProperty")?;
    let key = cx.args.get(1).unwrap_or_undefined();
    let key = PropertyKey::from_value(cx.scope, key)?;
    let descriptor = cx.args.get(2).unwrap_or_undefined();
    let descriptor = PropertyValue::from_descriptor_value(cx.scope, descriptor)?;
    target.define_own_property(cx.scope, key, descriptor)?;
    Ok(Value::Object(target))
}

pub fn get_own_property_descriptor(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.getOwnPropertyDescriptor")?;
    let key = cx.args.get(1).unwrap_or_undefined();
    let key = PropertyKey::from_value(cx.scope, key)?;
    match target.get_own_property_descriptor(cx.scope, key)? {
        Some(descriptor) => descriptor.to_descriptor_value(cx.scope),
        None => Ok(Value::undefined()),
    }
}

pub fn get_prototype_of(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.getPrototypeOf")?;
    target.get_prototype(cx.scope)
}

pub fn set_prototype_of(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let target = arg_object(&mut cx, 0, "Object.setPrototypeOf")?;
    let proto = cx.args.get(1).unwrap_or_undefined();
    target.set_prototype_checked(cx.scope, proto)?;
    Ok(Value::Object(target))
}
