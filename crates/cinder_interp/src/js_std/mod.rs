use cinder_middle::interner::{sym, Symbol};

use crate::localscope::LocalScope;
use crate::value::function::{register_native_fn, Function, FunctionKind, NativeFunction};
use crate::value::object::{Handle, Object, PropertyKey, PropertyValue};
use crate::value::Value;

pub mod array;
pub mod boolean;
pub mod console;
pub mod date;
pub mod error;
pub mod function;
pub mod global;
pub mod iterator;
pub mod json;
pub mod map;
pub mod math;
pub mod number;
pub mod object;
pub mod regex;
pub mod set;
pub mod string;
pub mod symbol;

/// Installs a non-enumerable data property.
pub(crate) fn register(sc: &mut LocalScope<'_>, target: &Handle, name: Symbol, value: Value) {
    let _ = target.set_property(sc, PropertyKey::String(name.into()), PropertyValue::static_non_enumerable(value));
}

/// Installs a native function as a non-enumerable method.
pub(crate) fn register_fn(sc: &mut LocalScope<'_>, target: &Handle, name: Symbol, fun: NativeFunction) {
    let handle = register_native_fn(sc, name, fun);
    register(sc, target, name, Value::Object(handle));
}

/// Installs a native function under a symbol key (e.g. `@@iterator`).
pub(crate) fn register_symbol_fn(
    sc: &mut LocalScope<'_>,
    target: &Handle,
    key: crate::value::symbol::JsSymbol,
    name: Symbol,
    fun: NativeFunction,
) {
    let handle = register_native_fn(sc, name, fun);
    let _ = target.set_property(
        sc,
        PropertyKey::Symbol(key),
        PropertyValue::static_non_enumerable(Value::Object(handle)),
    );
}

/// Creates a constructor function object, wires its `.prototype` and the
/// prototype's `constructor`, and binds it on the global scope.
pub(crate) fn register_ctor(
    sc: &mut LocalScope<'_>,
    global: &Handle,
    name: Symbol,
    fun: NativeFunction,
    prototype: &Handle,
) -> Handle {
    let ctor = Function::new(sc, Some(name.into()), FunctionKind::Native(fun));
    ctor.set_fn_prototype(prototype.clone());
    let ctor = sc.register(ctor);

    register(sc, prototype, sym::CONSTRUCTOR, Value::Object(ctor.clone()));
    register(sc, global, name, Value::Object(ctor.clone()));
    ctor
}

/// Populates a scope with the standard built-ins and links up every
/// intrinsic prototype.
pub fn init(sc: &mut LocalScope<'_>) {
    cinder_log::debug!("initialize standard objects");

    let global = sc.global();
    let object_prototype = sc.statics.object_prototype.clone();

    // Prototype chain roots: everything except Object.prototype hangs off
    // Object.prototype.
    for proto in [
        sc.statics.function_prototype.clone(),
        sc.statics.array_prototype.clone(),
        sc.statics.string_prototype.clone(),
        sc.statics.number_prototype.clone(),
        sc.statics.boolean_prototype.clone(),
        sc.statics.symbol_prototype.clone(),
        sc.statics.date_prototype.clone(),
        sc.statics.regexp_prototype.clone(),
        sc.statics.map_prototype.clone(),
        sc.statics.set_prototype.clone(),
        sc.statics.iterator_prototype.clone(),
        sc.statics.error_prototype.clone(),
        sc.statics.host_list_prototype.clone(),
        sc.statics.host_map_prototype.clone(),
    ] {
        let _ = proto.set_prototype(sc, Value::Object(object_prototype.clone()));
    }

    // The error subclasses inherit from Error.prototype.
    let error_prototype = sc.statics.error_prototype.clone();
    for proto in [
        sc.statics.eval_error_prototype.clone(),
        sc.statics.range_error_prototype.clone(),
        sc.statics.reference_error_prototype.clone(),
        sc.statics.syntax_error_prototype.clone(),
        sc.statics.type_error_prototype.clone(),
        sc.statics.uri_error_prototype.clone(),
        sc.statics.evaluator_error_prototype.clone(),
        sc.statics.wrapped_error_prototype.clone(),
    ] {
        let _ = proto.set_prototype(sc, Value::Object(error_prototype.clone()));
    }

    global::init(sc, &global);
    object::init(sc, &global);
    function::init(sc, &global);
    array::init(sc, &global);
    iterator::init(sc);
    string::init(sc, &global);
    number::init(sc, &global);
    boolean::init(sc, &global);
    symbol::init(sc, &global);
    math::init(sc, &global);
    json::init(sc, &global);
    error::init(sc, &global);
    map::init(sc, &global);
    set::init(sc, &global);
    date::init(sc, &global);
    regex::init(sc, &global);
    console::init(sc, &global);

    // `globalThis`
    register(sc, &global, sym::GLOBAL_THIS, Value::Object(global.clone()));
}
