use std::cell::{Cell, RefCell};

use cinder_middle::interner::sym;

use crate::delegate;
use crate::localscope::LocalScope;
use crate::throw;
use crate::value::object::{NamedObject, Object, PropertyKey, PropertyValue};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Typeof, Value};

use super::hashtable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterKind {
    Keys,
    Values,
    Entries,
}

/// Iterator over an array-like value.
#[derive(Debug)]
pub struct ArrayIterator {
    pub target: Value,
    pub index: Cell<usize>,
    pub kind: IterKind,
    obj: NamedObject,
}

impl ArrayIterator {
    pub fn new(sc: &LocalScope<'_>, target: Value, kind: IterKind) -> Self {
        Self {
            target,
            index: Cell::new(0),
            kind,
            obj: NamedObject::with_prototype(sc.statics.iterator_prototype.clone()),
        }
    }
}

impl Object for ArrayIterator {
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
        "Array Iterator"
    }
}

/// Iterator over a `Map` or `Set` table; wraps the mutation-tolerant
/// linked-list iterator.
#[derive(Debug)]
pub struct TableIterator {
    pub iter: RefCell<hashtable::Iter>,
    pub kind: IterKind,
    obj: NamedObject,
}

impl TableIterator {
    pub fn new(sc: &LocalScope<'_>, iter: hashtable::Iter, kind: IterKind) -> Self {
        Self {
            iter: RefCell::new(iter),
            kind,
            obj: NamedObject::with_prototype(sc.statics.iterator_prototype.clone()),
        }
    }
}

impl Object for TableIterator {
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
        "Map Iterator"
    }
}

/// Builds the `{ value, done }` step object of the iterator protocol.
pub fn result_object(sc: &mut LocalScope<'_>, value: Value, done: bool) -> Result<Value, Value> {
    let obj = NamedObject::new(sc);
    obj.set_property(sc, sym::VALUE.into(), PropertyValue::static_default(value))?;
    obj.set_property(sc, sym::DONE.into(), PropertyValue::static_default(Value::boolean(done)))?;
    Ok(Value::Object(sc.register(obj)))
}

/// Fetches and invokes a value's `@@iterator`.
pub fn get_iterator(sc: &mut LocalScope<'_>, value: &Value) -> Result<Value, Value> {
    let iterator_sym = sc.statics.symbol_iterator.clone();
    let method = value.get_property(sc, PropertyKey::Symbol(iterator_sym))?;
    if method.is_nullish() {
        throw!(sc, TypeError, "{} is not iterable", value.kind_name());
    }
    let iterator = method.apply(sc, value.clone(), Vec::new())?;
    if !matches!(iterator, Value::Object(_)) {
        throw!(sc, TypeError, "Result of the Symbol.iterator method is not an object");
    }
    Ok(iterator)
}

/// One `next()` step: returns the value and the `done` flag.
pub fn iterator_next(sc: &mut LocalScope<'_>, iterator: &Value) -> Result<(Value, bool), Value> {
    let next = iterator.get_property(sc, sym::NEXT.into())?;
    let step = next.apply(sc, iterator.clone(), Vec::new())?;
    let done = step.get_property(sc, sym::DONE.into())?.to_boolean(sc)?;
    let value = if done {
        Value::undefined()
    } else {
        step.get_property(sc, sym::VALUE.into())?
    };
    Ok((value, done))
}

/// Closes an iterator after an abnormal loop exit by invoking its
/// `return()` method, if any. Errors from `return()` are dropped so the
/// original completion wins.
pub fn iterator_close(sc: &mut LocalScope<'_>, iterator: &Value) {
    if let Ok(ret) = iterator.get_property(sc, sym::RETURN.into()) {
        if matches!(ret.type_of(), Typeof::Function) {
            let _ = ret.apply(sc, iterator.clone(), Vec::new());
        }
    }
}

/// Drains an iterable into a vector (used by spread and collection
/// constructors).
pub fn collect_iterable(sc: &mut LocalScope<'_>, value: &Value) -> Result<Vec<Value>, Value> {
    let iterator = get_iterator(sc, value)?;
    let mut out = Vec::new();
    loop {
        let (step, done) = iterator_next(sc, &iterator)?;
        if done {
            break;
        }
        out.push(step);
    }
    Ok(out)
}

/// Picks the piece of a key/value pair an iterator of the given kind
/// yields.
pub fn select_entry(sc: &mut LocalScope<'_>, kind: IterKind, key: Value, value: Value) -> Result<Value, Value> {
    Ok(match kind {
        IterKind::Keys => key,
        IterKind::Values => value,
        IterKind::Entries => {
            let pair = crate::value::array::Array::with_items(sc, vec![key, value]);
            Value::Object(sc.register(pair))
        }
    })
}

/// Helper for native `next` methods: missing step values surface as
/// `undefined`.
pub fn step_or_done(sc: &mut LocalScope<'_>, step: Option<Value>) -> Result<Value, Value> {
    match step {
        Some(value) => result_object(sc, value, false),
        None => result_object(sc, Value::undefined(), true),
    }
}
