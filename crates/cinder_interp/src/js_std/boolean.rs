use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::CallContext;
use crate::value::object::Handle;
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.boolean_prototype.clone();
    register_fn(sc, &prototype, sym::TO_STRING, to_string);
    register_fn(sc, &prototype, sym::VALUE_OF, value_of);

    register_ctor(sc, global, sym::BOOLEAN, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let value = cx.args.first().unwrap_or_undefined().to_boolean(cx.scope)?;
    Ok(Value::boolean(value))
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let b = cx.this.clone().to_boolean(cx.scope)?;
    Ok(Value::string(
        if b { sym::TRUE_LIT } else { sym::FALSE_LIT }.into(),
    ))
}

pub fn value_of(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let b = cx.this.clone().to_boolean(cx.scope)?;
    Ok(Value::boolean(b))
}
