use cinder_middle::interner::sym;

use crate::hostbridge::object::HostIterator;
use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::get_index;
use crate::value::function::CallContext;
use crate::value::iterator::{result_object, select_entry, ArrayIterator, IterKind, TableIterator};
use crate::value::ops::conversions::ValueConversion;
use crate::value::Value;

use super::{register_fn, register_symbol_fn};

pub fn init(sc: &mut LocalScope<'_>) {
    let prototype = sc.statics.iterator_prototype.clone();
    register_fn(sc, &prototype, sym::NEXT, next);

    // Iterators are themselves iterable.
    let iterator_sym = sc.statics.symbol_iterator.clone();
    register_symbol_fn(sc, &prototype, iterator_sym, sym::ITERATOR, identity);
}

fn identity(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(cx.this.clone())
}

/// One `next` implementation serving every built-in iterator kind; the
/// receiver's concrete type picks the stepping strategy.
pub fn next(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    if let Some(iterator) = cx.this.downcast_ref::<ArrayIterator>() {
        let target = iterator.target.clone();
        let kind = iterator.kind;
        let index = iterator.index.get();
        let len = target.length_of_array_like(cx.scope)?;

        if index >= len {
            return result_object(cx.scope, Value::undefined(), true);
        }
        iterator.index.set(index + 1);

        let value = get_index(cx.scope, &target, index)?;
        let step = select_entry(cx.scope, kind, Value::number(index as f64), value)?;
        return result_object(cx.scope, step, false);
    }

    if let Some(iterator) = cx.this.downcast_ref::<TableIterator>() {
        let kind = iterator.kind;
        let step = iterator.iter.borrow_mut().next();
        return match step {
            Some((key, value)) => {
                let step = select_entry(cx.scope, kind, key, value)?;
                result_object(cx.scope, step, false)
            }
            None => result_object(cx.scope, Value::undefined(), true),
        };
    }

    if let Some(iterator) = cx.this.downcast_ref::<HostIterator>() {
        return match iterator.step() {
            Some(raw) => {
                let value = crate::hostbridge::wrap_host_value(cx.scope, raw)?;
                result_object(cx.scope, value, false)
            }
            None => result_object(cx.scope, Value::undefined(), true),
        };
    }

    throw!(cx.scope, TypeError, "next called on incompatible receiver")
}
