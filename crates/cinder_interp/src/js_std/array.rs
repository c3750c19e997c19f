use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::{elements_of, get_index, set_index, Array};
use crate::value::function::CallContext;
use crate::value::iterator::{ArrayIterator, IterKind};
use crate::value::object::{Handle, Object, PropertyKey, PropertyValue};
use crate::value::ops::conversions::ValueConversion;
use crate::value::ops::equality::strict_eq;
use crate::value::{Typeof, Value, ValueContext};

use super::{register_ctor, register_fn, register_symbol_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.array_prototype.clone();

    for (name, fun) in [
        (sym::PUSH, push as crate::value::function::NativeFunction),
        (sym::POP, pop),
        (sym::SHIFT, shift),
        (sym::UNSHIFT, unshift),
        (sym::CONCAT, concat),
        (sym::JOIN, join),
        (sym::REVERSE, reverse),
        (sym::SLICE, slice),
        (sym::SPLICE, splice),
        (sym::EVERY, every),
        (sym::SOME, some),
        (sym::FILTER, filter),
        (sym::MAP_FN, map),
        (sym::REDUCE, reduce),
        (sym::REDUCE_RIGHT, reduce_right),
        (sym::FIND, find),
        (sym::FIND_INDEX, find_index),
        (sym::FIND_LAST, find_last),
        (sym::FIND_LAST_INDEX, find_last_index),
        (sym::INDEX_OF, index_of),
        (sym::INCLUDES, includes),
        (sym::FOR_EACH, for_each),
        (sym::KEYS, keys),
        (sym::VALUES, values),
        (sym::ENTRIES, entries),
        (sym::TO_STRING, to_string),
    ] {
        register_fn(sc, &prototype, name, fun);
    }

    let iterator_sym = sc.statics.symbol_iterator.clone();
    register_symbol_fn(sc, &prototype, iterator_sym.clone(), sym::VALUES, values);

    // The host-list wrapper shares the whole method suite; every function
    // here goes through the generic indexed protocol.
    let host_list = sc.statics.host_list_prototype.clone();
    let descriptors: Vec<(PropertyKey, PropertyValue)> = {
        let mut out = Vec::new();
        let keys = prototype.own_keys(sc).unwrap_or_default();
        for key in keys {
            if let Ok(key) = PropertyKey::from_value(sc, key) {
                if let Ok(Some(desc)) = prototype.get_own_property_descriptor(sc, key.clone()) {
                    out.push((key, desc));
                }
            }
        }
        out
    };
    for (key, desc) in descriptors {
        let _ = host_list.set_property(sc, key, desc);
    }
    register_symbol_fn(sc, &host_list, iterator_sym, sym::VALUES, values);

    let ctor = register_ctor(sc, global, sym::ARRAY, constructor, &prototype);
    let is_array_sym = sc.intern("isArray");
    let of_sym = sc.intern("of");
    let from_sym = sc.intern("from");
    register_fn(sc, &ctor, is_array_sym, is_array);
    register_fn(sc, &ctor, of_sym, of);
    register_fn(sc, &ctor, from_sym, from);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let items = match cx.args.as_slice() {
        [Value::Number(len)] => vec![Value::undefined(); *len as usize],
        args => args.to_vec(),
    };
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn is_array(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let is = matches!(cx.args.first(), Some(value) if value.downcast_ref::<Array>().is_some());
    Ok(Value::boolean(is))
}

pub fn of(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let array = Array::with_items(cx.scope, cx.args.clone());
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn from(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let source = cx.args.first().unwrap_or_undefined();
    let items = crate::value::iterator::collect_iterable(cx.scope, &source)
        .or_else(|_| elements_of(cx.scope, &source))?;
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

fn this_length(cx: &mut CallContext<'_, '_>) -> Result<usize, Value> {
    let this = cx.this.clone();
    this.length_of_array_like(cx.scope)
}

fn set_length(cx: &mut CallContext<'_, '_>, len: usize) -> Result<(), Value> {
    let this = cx.this.clone();
    this.set_property(
        cx.scope,
        sym::LENGTH.into(),
        PropertyValue::static_default(Value::number(len as f64)),
    )
}

/// Resolves a relative index argument (negative counts from the end).
fn relative_index(sc: &mut LocalScope<'_>, value: Option<&Value>, len: usize, default: usize) -> Result<usize, Value> {
    match value {
        None | Some(Value::Undefined) => Ok(default),
        Some(value) => {
            let index = value.to_integer_or_infinity(sc)?;
            Ok(if index < 0.0 {
                (len as f64 + index).max(0.0) as usize
            } else {
                (index as usize).min(len)
            })
        }
    }
}

pub fn push(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut len = this_length(&mut cx)?;
    let this = cx.this.clone();
    for arg in cx.args.clone() {
        set_index(cx.scope, &this, len, arg)?;
        len += 1;
    }
    Ok(Value::number(len as f64))
}

pub fn pop(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let len = this_length(&mut cx)?;
    if len == 0 {
        return Ok(Value::undefined());
    }
    let this = cx.this.clone();
    let value = get_index(cx.scope, &this, len - 1)?;
    set_length(&mut cx, len - 1)?;
    Ok(value)
}

pub fn shift(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let len = this_length(&mut cx)?;
    if len == 0 {
        return Ok(Value::undefined());
    }
    let this = cx.this.clone();
    let first = get_index(cx.scope, &this, 0)?;
    for index in 1..len {
        let value = get_index(cx.scope, &this, index)?;
        set_index(cx.scope, &this, index - 1, value)?;
    }
    set_length(&mut cx, len - 1)?;
    Ok(first)
}

pub fn unshift(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let len = this_length(&mut cx)?;
    let added = cx.args.len();
    let this = cx.this.clone();

    for index in (0..len).rev() {
        let value = get_index(cx.scope, &this, index)?;
        set_index(cx.scope, &this, index + added, value)?;
    }
    for (index, arg) in cx.args.clone().into_iter().enumerate() {
        set_index(cx.scope, &this, index, arg)?;
    }
    Ok(Value::number((len + added) as f64))
}

pub fn concat(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut items = elements_of(cx.scope, &cx.this.clone())?;
    let spreadable_sym = cx.scope.statics.symbol_is_concat_spreadable.clone();

    for arg in cx.args.clone() {
        // `@@isConcatSpreadable` (and array-ness) controls flattening.
        let spread = match &arg {
            Value::Object(handle) => {
                let marker = handle.get_property(cx.scope, PropertyKey::Symbol(spreadable_sym.clone()))?;
                match marker {
                    Value::Undefined => arg.downcast_ref::<Array>().is_some(),
                    marker => marker.to_boolean(cx.scope)?,
                }
            }
            _ => false,
        };

        if spread {
            items.extend(elements_of(cx.scope, &arg)?);
        } else {
            items.push(arg);
        }
    }

    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn join(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let separator = match cx.args.first() {
        None | Some(Value::Undefined) => ",".to_string(),
        Some(value) => value.to_js_string(cx.scope)?.to_rc(cx.scope).to_string(),
    };

    let items = elements_of(cx.scope, &cx.this.clone())?;
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(&separator);
        }
        if !item.is_nullish() {
            let text = item.to_js_string(cx.scope)?;
            out.push_str(&text.to_rc(cx.scope));
        }
    }

    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    join(CallContext {
        args: Vec::new(),
        this: cx.this.clone(),
        scope: cx.scope,
        new_target: None,
    })
}

pub fn reverse(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut items = elements_of(cx.scope, &cx.this.clone())?;
    items.reverse();
    let this = cx.this.clone();
    for (index, item) in items.into_iter().enumerate() {
        set_index(cx.scope, &this, index, item)?;
    }
    Ok(this)
}

pub fn slice(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let len = this_length(&mut cx)?;
    let start = relative_index(cx.scope, cx.args.first(), len, 0)?;
    let end = relative_index(cx.scope, cx.args.get(1), len, len)?;

    let mut items = Vec::new();
    let this = cx.this.clone();
    for index in start..end.max(start) {
        items.push(get_index(cx.scope, &this, index)?);
    }
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn splice(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let len = this_length(&mut cx)?;
    let start = relative_index(cx.scope, cx.args.first(), len, 0)?;
    let delete_count = match cx.args.get(1) {
        None => len - start,
        Some(value) => {
            let n = value.to_integer_or_infinity(cx.scope)?;
            (n.max(0.0) as usize).min(len - start)
        }
    };
    let inserted: Vec<Value> = cx.args.get(2..).map(|s| s.to_vec()).unwrap_or_default();

    let this = cx.this.clone();
    let mut items = elements_of(cx.scope, &this)?;
    let removed: Vec<Value> = items
        .splice(start..start + delete_count, inserted)
        .collect();

    for (index, item) in items.iter().cloned().enumerate() {
        set_index(cx.scope, &this, index, item)?;
    }
    set_length(&mut cx, items.len())?;

    let array = Array::with_items(cx.scope, removed);
    Ok(Value::Object(cx.scope.register(array)))
}

/// Shared driver for the callback-based traversals.
fn each<F>(cx: &mut CallContext<'_, '_>, mut visit: F) -> Result<(), Value>
where
    F: FnMut(&mut LocalScope<'_>, Value, usize) -> Result<bool, Value>,
{
    let len = this_length(cx)?;
    let this = cx.this.clone();
    for index in 0..len {
        let item = get_index(cx.scope, &this, index)?;
        if !visit(cx.scope, item, index)? {
            break;
        }
    }
    Ok(())
}

fn callback_arg(cx: &CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = cx.args.first().unwrap_or_undefined();
    if !matches!(callback.type_of(), Typeof::Function) {
        return Err(Value::undefined());
    }
    Ok(callback)
}

fn expect_callback(cx: &mut CallContext<'_, '_>, name: &str) -> Result<Value, Value> {
    match callback_arg(cx) {
        Ok(callback) => Ok(callback),
        Err(_) => throw!(cx.scope, TypeError, "{}: callback is not a function", name),
    }
}

fn invoke_visitor(
    sc: &mut LocalScope<'_>,
    callback: &Value,
    this: &Value,
    item: Value,
    index: usize,
) -> Result<Value, Value> {
    callback.apply(
        sc,
        Value::undefined(),
        vec![item, Value::number(index as f64), this.clone()],
    )
}

pub fn every(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, "Array.prototype.every")?;
    let this = cx.this.clone();
    let mut result = true;
    each(&mut cx, |sc, item, index| {
        let keep = invoke_visitor(sc, &callback, &this, item, index)?.to_boolean(sc)?;
        if !keep {
            result = false;
        }
        Ok(keep)
    })?;
    Ok(Value::boolean(result))
}

pub fn some(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, "Array.prototype.some")?;
    let this = cx.this.clone();
    let mut result = false;
    each(&mut cx, |sc, item, index| {
        let hit = invoke_visitor(sc, &callback, &this, item, index)?.to_boolean(sc)?;
        if hit {
            result = true;
        }
        Ok(!hit)
    })?;
    Ok(Value::boolean(result))
}

pub fn filter(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, "Array.prototype.filter")?;
    let this = cx.this.clone();
    let mut items = Vec::new();
    each(&mut cx, |sc, item, index| {
        if invoke_visitor(sc, &callback, &this, item.clone(), index)?.to_boolean(sc)? {
            items.push(item);
        }
        Ok(true)
    })?;
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn map(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, "Array.prototype.map")?;
    let this = cx.this.clone();
    let mut items = Vec::new();
    each(&mut cx, |sc, item, index| {
        items.push(invoke_visitor(sc, &callback, &this, item, index)?);
        Ok(true)
    })?;
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn for_each(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, "Array.prototype.forEach")?;
    let this = cx.this.clone();
    each(&mut cx, |sc, item, index| {
        invoke_visitor(sc, &callback, &this, item, index)?;
        Ok(true)
    })?;
    Ok(Value::undefined())
}

fn reduce_impl(mut cx: CallContext<'_, '_>, reversed: bool, name: &str) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, name)?;
    let this = cx.this.clone();
    let items = elements_of(cx.scope, &this)?;
    let len = items.len();

    let order: Vec<usize> = if reversed { (0..len).rev().collect() } else { (0..len).collect() };
    let mut order = order.into_iter();

    let mut acc = match cx.args.get(1) {
        Some(seed) => seed.clone(),
        None => match order.next() {
            Some(index) => items[index].clone(),
            None => throw!(cx.scope, TypeError, "Reduce of empty array with no initial value"),
        },
    };

    for index in order {
        acc = callback.apply(
            cx.scope,
            Value::undefined(),
            vec![acc, items[index].clone(), Value::number(index as f64), this.clone()],
        )?;
    }
    Ok(acc)
}

pub fn reduce(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    reduce_impl(cx, false, "Array.prototype.reduce")
}

pub fn reduce_right(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    reduce_impl(cx, true, "Array.prototype.reduceRight")
}

fn find_impl(mut cx: CallContext<'_, '_>, reversed: bool, want_index: bool, name: &str) -> Result<Value, Value> {
    let callback = expect_callback(&mut cx, name)?;
    let this = cx.this.clone();
    let items = elements_of(cx.scope, &this)?;

    let indices: Vec<usize> = if reversed {
        (0..items.len()).rev().collect()
    } else {
        (0..items.len()).collect()
    };

    for index in indices {
        let item = items[index].clone();
        if invoke_visitor(cx.scope, &callback, &this, item.clone(), index)?.to_boolean(cx.scope)? {
            return Ok(if want_index {
                Value::number(index as f64)
            } else {
                item
            });
        }
    }

    Ok(if want_index { Value::number(-1.0) } else { Value::undefined() })
}

pub fn find(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    find_impl(cx, false, false, "Array.prototype.find")
}

pub fn find_index(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    find_impl(cx, false, true, "Array.prototype.findIndex")
}

pub fn find_last(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    find_impl(cx, true, false, "Array.prototype.findLast")
}

pub fn find_last_index(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    find_impl(cx, true, true, "Array.prototype.findLastIndex")
}

pub fn index_of(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let needle = cx.args.first().unwrap_or_undefined();
    let items = elements_of(cx.scope, &cx.this.clone())?;
    let found = items.iter().position(|item| strict_eq(item, &needle));
    Ok(Value::number(found.map(|i| i as f64).unwrap_or(-1.0)))
}

pub fn includes(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let needle = cx.args.first().unwrap_or_undefined();
    let items = elements_of(cx.scope, &cx.this.clone())?;
    let found = items
        .iter()
        .any(|item| crate::value::ops::equality::same_zero(item, &needle));
    Ok(Value::boolean(found))
}

pub fn keys(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iterator = ArrayIterator::new(cx.scope, cx.this.clone(), IterKind::Keys);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn values(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iterator = ArrayIterator::new(cx.scope, cx.this.clone(), IterKind::Values);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn entries(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iterator = ArrayIterator::new(cx.scope, cx.this.clone(), IterKind::Entries);
    Ok(Value::Object(cx.scope.register(iterator)))
}
