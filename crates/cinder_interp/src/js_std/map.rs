use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::{this_downcast, CallContext};
use crate::value::iterator::{collect_iterable, IterKind, TableIterator};
use crate::value::map::Map;
use crate::value::object::{Handle, Object};
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn, register_symbol_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.map_prototype.clone();

    register_fn(sc, &prototype, sym::GET, get);
    register_fn(sc, &prototype, sym::SET, set);
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
    register_fn(sc, &prototype, sym::KEYS, keys);
    register_fn(sc, &prototype, sym::VALUES, values);
    register_fn(sc, &prototype, sym::ENTRIES, entries);
    register_fn(sc, &prototype, sym::FOR_EACH, for_each);

    let iterator_sym = sc.statics.symbol_iterator.clone();
    register_symbol_fn(sc, &prototype, iterator_sym, sym::ENTRIES, entries);

    register_ctor(sc, global, sym::MAP, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let map = Map::new(cx.scope);

    if let Some(iterable) = cx.args.first() {
        if !iterable.is_nullish() {
            // Entries come in as [key, value] pairs through the iterator
            // protocol.
            for entry in collect_iterable(cx.scope, &iterable.clone())? {
                let key = entry.get_property(cx.scope, sym::ZERO.into())?;
                let value = entry.get_property(cx.scope, sym::ONE.into())?;
                map.set(key, value);
            }
        }
    }

    Ok(Value::Object(cx.scope.register(map)))
}

pub fn set(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.set")?;
    let key = cx.args.first().unwrap_or_undefined();
    let value = cx.args.get(1).unwrap_or_undefined();
    this.set(key, value);
    Ok(cx.this.clone())
}

pub fn get(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.get")?;
    let key = cx.args.first().unwrap_or_undefined();
    Ok(this.get(&key).unwrap_or_undefined())
}

pub fn has(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.has")?;
    let key = cx.args.first().unwrap_or_undefined();
    Ok(Value::boolean(this.has(&key)))
}

pub fn delete(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.delete")?;
    let key = cx.args.first().unwrap_or_undefined();
    Ok(Value::boolean(this.delete(&key)))
}

pub fn clear(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.clear")?;
    this.clear();
    Ok(Value::undefined())
}

pub fn size(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.size")?;
    Ok(Value::number(this.size() as f64))
}

fn iterator(cx: CallContext<'_, '_>, kind: IterKind, name: &str) -> Result<Value, Value> {
    let iter = this_downcast::<Map>(&cx.this, cx.scope, name)?.entries();
    let iterator = TableIterator::new(cx.scope, iter, kind);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn keys(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    iterator(cx, IterKind::Keys, "Map.prototype.keys")
}

pub fn values(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    iterator(cx, IterKind::Values, "Map.prototype.values")
}

pub fn entries(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    iterator(cx, IterKind::Entries, "Map.prototype.entries")
}

pub fn for_each(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let callback = cx.args.first().unwrap_or_undefined();
    let entries: Vec<(Value, Value)> =
        this_downcast::<Map>(&cx.this, cx.scope, "Map.prototype.forEach")?.entries().collect();
    for (key, value) in entries {
        callback.apply(cx.scope, Value::undefined(), vec![value, key, cx.this.clone()])?;
    }
    Ok(Value::undefined())
}
