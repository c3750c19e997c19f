use std::rc::Rc;

use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::Array;
use crate::value::function::{this_downcast, CallContext};
use crate::value::object::Handle;
use crate::value::ops::conversions::ValueConversion;
use crate::value::regex::RegExp;
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.regexp_prototype.clone();

    let test_sym = sc.intern("test");
    let exec_sym = sc.intern("exec");
    register_fn(sc, &prototype, test_sym, test);
    register_fn(sc, &prototype, exec_sym, exec);
    register_fn(sc, &prototype, sym::TO_STRING, to_string);

    register_ctor(sc, global, sym::REG_EXP, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let source: Rc<str> = match cx.args.first() {
        Some(pattern) if pattern.downcast_ref::<RegExp>().is_some() => {
            Rc::from(pattern.downcast_ref::<RegExp>().unwrap().source())
        }
        Some(pattern) => pattern.to_js_string(cx.scope)?.to_rc(cx.scope),
        None => Rc::from(""),
    };
    let flags: Rc<str> = match cx.args.get(1) {
        None | Some(Value::Undefined) => Rc::from(""),
        Some(flags) => flags.to_js_string(cx.scope)?.to_rc(cx.scope),
    };

    match RegExp::new(cx.scope, source, flags) {
        Ok(regex) => Ok(Value::Object(cx.scope.register(regex))),
        Err(err) => throw!(cx.scope, SyntaxError, "Invalid regular expression: {}", err),
    }
}

pub fn test(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let input = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    let input = input.to_rc(cx.scope);
    let this = this_downcast::<RegExp>(&cx.this, cx.scope, "RegExp.prototype.test")?;
    Ok(Value::boolean(this.regex().is_match(&input)))
}

pub fn exec(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let input = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    let input = input.to_rc(cx.scope);

    let groups = {
        let this = this_downcast::<RegExp>(&cx.this, cx.scope, "RegExp.prototype.exec")?;
        let start = if this.is_global() { this.last_index.get().min(input.len()) } else { 0 };
        match this.regex().captures(&input[start..]) {
            Some(captures) => {
                let all: Vec<Option<String>> = captures
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_owned()))
                    .collect();
                if this.is_global() {
                    let end = captures.get(0).map(|m| start + m.end()).unwrap_or(start);
                    this.last_index.set(end);
                }
                all
            }
            None => {
                if this.is_global() {
                    this.last_index.set(0);
                }
                return Ok(Value::null());
            }
        }
    };

    let mut items = Vec::with_capacity(groups.len());
    for group in groups {
        items.push(match group {
            Some(text) => {
                let sym = cx.scope.intern(&*text);
                Value::string(sym.into())
            }
            None => Value::undefined(),
        });
    }
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

pub fn to_string(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let this = this_downcast::<RegExp>(&cx.this, cx.scope, "RegExp.prototype.toString")?;
    let text = format!("/{}/{}", this.source(), this.flags());
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}
