use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::CallContext;
use crate::value::object::{Handle, Object, PropertyKey, PropertyValue};
use crate::value::ops::conversions::ValueConversion;
use crate::value::symbol::JsSymbol;
use crate::value::{Value, ValueContext};

use super::{register, register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.symbol_prototype.clone();
    register_fn(sc, &prototype, sym::TO_STRING, to_string);

    let ctor = register_ctor(sc, global, sym::SYMBOL, constructor, &prototype);
    let for_sym = sc.intern("for");
    register_fn(sc, &ctor, for_sym, symbol_for);

    // The well-known symbols.
    let iterator = sc.statics.symbol_iterator.clone();
    let to_primitive = sc.statics.symbol_to_primitive.clone();
    let is_concat_spreadable = sc.statics.symbol_is_concat_spreadable.clone();
    let to_string_tag = sc.statics.symbol_to_string_tag.clone();
    register(sc, &ctor, sym::ITERATOR, Value::Symbol(iterator));
    let to_primitive_name = sc.intern("toPrimitive");
    let spreadable_name = sc.intern("isConcatSpreadable");
    let tag_name = sc.intern("toStringTag");
    register(sc, &ctor, to_primitive_name, Value::Symbol(to_primitive));
    register(sc, &ctor, spreadable_name, Value::Symbol(is_concat_spreadable));
    register(sc, &ctor, tag_name, Value::Symbol(to_string_tag));
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    if cx.new_target.is_some() {
        crate::throw!(cx.scope, TypeError, "Symbol is not a constructor");
    }
    let description = match cx.args.first() {
        None | Some(Value::Undefined) => None,
        Some(value) => Some(value.to_js_string(cx.scope)?),
    };
    Ok(Value::Symbol(JsSymbol::new(description)))
}

/// `Symbol.for`: one symbol per key per context, so registry equality
/// coincides with identity.
pub fn symbol_for(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let key = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    Ok(Value::Symbol(cx.scope.symbol_for(key.sym())))
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let Value::Symbol(symbol) = &cx.this else {
        crate::throw!(cx.scope, TypeError, "Symbol.prototype.toString called on incompatible receiver");
    };
    let description = symbol
        .description()
        .map(|d| d.to_rc(cx.scope).to_string())
        .unwrap_or_default();
    let text = format!("Symbol({description})");
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

/// Installs `@@iterator`-style members used by tests or embedders that
/// build objects manually.
pub fn define_iterator(sc: &mut LocalScope<'_>, target: &Handle, function: Value) {
    let key = PropertyKey::Symbol(sc.statics.symbol_iterator.clone());
    let _ = target.set_property(sc, key, PropertyValue::static_non_enumerable(function));
}
