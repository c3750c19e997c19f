use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::{this_downcast, CallContext};
use crate::value::iterator::{collect_iterable, IterKind, TableIterator};
use crate::value::object::{Handle, Object};
use crate::value::set::Set;
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn, register_symbol_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.set_prototype.clone();

    register_fn(sc, &prototype, sym::ADD, add);
    register_fn(sc, &prototype, sym::HAS, has);
    register_fn(sc, &prototype, sym::DELETE, delete);
    register_fn(sc, &prototype, sym::CLEAR, clear);

    // `size` is an accessor, not a method.
    let size_fn = crate::value::function::register_native_fn(sc, sym::SIZE, size);
    let _ = prototype.set_property(
        sc,
        sym::SIZE.into(),
        crate::value::object::PropertyValue::accessor(
            Some(size_fn),
            None,
            crate::value::object::PropertyDataDescriptor::CONFIGURABLE,
        ),
    );
    register_fn(sc, &prototype, sym::KEYS, values);
    register_fn(sc, &prototype, sym::VALUES, values);
    register_fn(sc, &prototype, sym::ENTRIES, entries);
    register_fn(sc, &prototype, sym::FOR_EACH, for_each);

    let iterator_sym = sc.statics.symbol_iterator.clone();
    register_symbol_fn(sc, &prototype, iterator_sym, sym::VALUES, values);

    register_ctor(sc, global, sym::SET_NAME, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let set = Set::new(cx.scope);

    if let Some(iterable) = cx.args.first() {
        if !iterable.is_nullish() {
            for item in collect_iterable(cx.scope, &iterable.clone())? {
                set.add(item);
            }
        }
    }

    Ok(Value::Object(cx.scope.register(set)))
}

pub fn add(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.add")?;
    this.add(cx.args.first().unwrap_or_undefined());
    Ok(cx.this.clone())
}

pub fn has(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.has")?;
    Ok(Value::boolean(this.has(&cx.args.first().unwrap_or_undefined())))
}

pub fn delete(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.delete")?;
    Ok(Value::boolean(this.delete(&cx.args.first().unwrap_or_undefined())))
}

pub fn clear(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.clear")?;
    this.clear();
    Ok(Value::undefined())
}

pub fn size(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.size")?;
    Ok(Value::number(this.size() as f64))
}

pub fn values(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iter = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.values")?.entries();
    let iterator = TableIterator::new(cx.scope, iter, IterKind::Keys);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn entries(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iter = this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.entries")?.entries();
    let iterator = TableIterator::new(cx.scope, iter, IterKind::Entries);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn for_each(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = cx.args.first().unwrap_or_undefined();
    let entries: Vec<(Value, Value)> =
        this_downcast::<Set>(&cx.this, cx.scope, "Set.prototype.forEach")?.entries().collect();
    for (key, value) in entries {
        callback.apply(cx.scope, Value::undefined(), vec![value, key, cx.this.clone()])?;
    }
    Ok(Value::undefined())
}
