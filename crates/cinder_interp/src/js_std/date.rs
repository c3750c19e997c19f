use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::date::Date;
use crate::value::function::{this_downcast, CallContext};
use crate::value::object::Handle;
use crate::value::ops::conversions::ValueConversion;
use crate::value::Value;

use super::{register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.date_prototype.clone();

    let get_time_sym = sc.intern("getTime");
    let to_iso_sym = sc.intern("toISOString");
    register_fn(sc, &prototype, get_time_sym, get_time);
    register_fn(sc, &prototype, sym::VALUE_OF, get_time);
    register_fn(sc, &prototype, to_iso_sym, to_iso_string);
    register_fn(sc, &prototype, sym::TO_STRING, to_iso_string);

    let ctor = register_ctor(sc, global, sym::DATE, constructor, &prototype);
    let now_sym = sc.intern("now");
    register_fn(sc, &ctor, now_sym, now);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let epoch_ms = match cx.args.first() {
        None => Date::now_ms(),
        Some(value) => value.to_number(cx.scope)?,
    };
    let date = Date::new(cx.scope, epoch_ms);
    Ok(Value::Object(cx.scope.register(date)))
}

pub fn now(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let _ = cx;
    Ok(Value::number(Date::now_ms()))
}

pub fn get_time(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<Date>(&cx.this, cx.scope, "Date.prototype.getTime")?;
    Ok(Value::number(this.epoch_ms()))
}

pub fn to_iso_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let text = this_downcast::<Date>(&cx.this, cx.scope, "Date.prototype.toISOString")?.to_iso_string();
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}
