use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::Array;
use crate::value::function::CallContext;
use crate::value::iterator::{ArrayIterator, IterKind};
use crate::value::object::Handle;
use crate::value::ops::conversions::ValueConversion;
use crate::value::regex::RegExp;
use crate::value::string::{from_code_units, JsString};
use crate::value::{Value, ValueContext};

use super::{register_ctor, register_fn, register_symbol_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.string_prototype.clone();

    for (name, fun) in [
        ("charAt", char_at as crate::value::function::NativeFunction),
        ("charCodeAt", char_code_at),
        ("indexOf", index_of),
        ("lastIndexOf", last_index_of),
        ("includes", includes),
        ("startsWith", starts_with),
        ("endsWith", ends_with),
        ("slice", slice),
        ("substring", substring),
        ("split", split),
        ("trim", trim),
        ("trimStart", trim_start),
        ("trimEnd", trim_end),
        ("toLowerCase", to_lower_case),
        ("toUpperCase", to_upper_case),
        ("repeat", repeat),
        ("padStart", pad_start),
        ("padEnd", pad_end),
        ("concat", concat),
        ("at", at),
        ("replace", replace),
        ("toString", to_string),
        ("valueOf", to_string),
    ] {
        let name = sc.intern(name);
        register_fn(sc, &prototype, name, fun);
    }

    let iterator_sym = sc.statics.symbol_iterator.clone();
    register_symbol_fn(sc, &prototype, iterator_sym, sym::VALUES, iterate);

    register_ctor(sc, global, sym::STRING, constructor, &prototype);
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let value = match cx.args.first() {
        Some(value) => value.to_js_string(cx.scope)?,
        None => sym::EMPTY.into(),
    };
    Ok(Value::string(value))
}

/// The receiver as a string, via `toString` coercion.
fn this_string(cx: &mut CallContext<'_, '_>) -> Result<JsString, Value> {
    let this = cx.this.clone();
    this.to_js_string(cx.scope)
}

pub fn to_string(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    Ok(Value::string(s))
}

fn iterate(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let iterator = ArrayIterator::new(cx.scope, cx.this.clone(), IterKind::Values);
    Ok(Value::Object(cx.scope.register(iterator)))
}

pub fn char_at(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let index = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    let units = s.code_units(cx.scope);
    let unit = (index >= 0.0).then(|| units.get(index as usize)).flatten();
    let text = unit.map(|&u| from_code_units(&[u])).unwrap_or_default();
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

pub fn char_code_at(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let index = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    let units = s.code_units(cx.scope);
    match (index >= 0.0).then(|| units.get(index as usize)).flatten() {
        Some(&unit) => Ok(Value::number(unit as f64)),
        None => Ok(Value::number(f64::NAN)),
    }
}

pub fn at(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let units = s.code_units(cx.scope);
    let mut index = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    if index < 0.0 {
        index += units.len() as f64;
    }
    if index < 0.0 || index >= units.len() as f64 {
        return Ok(Value::undefined());
    }
    let text = from_code_units(&units[index as usize..index as usize + 1]);
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

fn arg_string(cx: &mut CallContext<'_, '_>, index: usize) -> Result<std::rc::Rc<str>, Value> {
    let arg = cx.args.get(index).unwrap_or_undefined();
    let s = arg.to_js_string(cx.scope)?;
    Ok(s.to_rc(cx.scope))
}

pub fn index_of(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let needle = arg_string(&mut cx, 0)?;
    Ok(Value::number(
        s.find(&*needle).map(|i| utf16_index(&s, i) as f64).unwrap_or(-1.0),
    ))
}

pub fn last_index_of(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let needle = arg_string(&mut cx, 0)?;
    Ok(Value::number(
        s.rfind(&*needle).map(|i| utf16_index(&s, i) as f64).unwrap_or(-1.0),
    ))
}

/// Converts a byte offset into a UTF-16 code-unit offset.
fn utf16_index(s: &str, byte_index: usize) -> usize {
    s[..byte_index].encode_utf16().count()
}

pub fn includes(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let needle = arg_string(&mut cx, 0)?;
    Ok(Value::boolean(s.contains(&*needle)))
}

pub fn starts_with(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let needle = arg_string(&mut cx, 0)?;
    Ok(Value::boolean(s.starts_with(&*needle)))
}

pub fn ends_with(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let needle = arg_string(&mut cx, 0)?;
    Ok(Value::boolean(s.ends_with(&*needle)))
}

fn clamp_range(units_len: usize, start: f64, end: f64) -> (usize, usize) {
    let clamp = |v: f64| -> usize {
        if v < 0.0 {
            (units_len as f64 + v).max(0.0) as usize
        } else {
            (v as usize).min(units_len)
        }
    };
    (clamp(start), clamp(end))
}

pub fn slice(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let units = s.code_units(cx.scope);
    let start = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    let end = match cx.args.get(1) {
        None | Some(Value::Undefined) => units.len() as f64,
        Some(value) => value.to_integer_or_infinity(cx.scope)?,
    };
    let (start, end) = clamp_range(units.len(), start, end);
    let text = if start < end {
        from_code_units(&units[start..end])
    } else {
        String::new()
    };
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

pub fn substring(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let units = s.code_units(cx.scope);
    let a = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    let b = match cx.args.get(1) {
        None | Some(Value::Undefined) => units.len() as f64,
        Some(value) => value.to_integer_or_infinity(cx.scope)?,
    };
    let a = (a.max(0.0) as usize).min(units.len());
    let b = (b.max(0.0) as usize).min(units.len());
    let (start, end) = (a.min(b), a.max(b));
    let text = from_code_units(&units[start..end]);
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

pub fn split(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);

    let parts: Vec<String> = match cx.args.first() {
        None | Some(Value::Undefined) => vec![s.to_string()],
        Some(separator) => {
            if let Some(regex) = separator.downcast_ref::<RegExp>() {
                regex.regex().split(&s).map(str::to_owned).collect()
            } else {
                let separator = separator.clone().to_js_string(cx.scope)?.to_rc(cx.scope);
                if separator.is_empty() {
                    s.chars().map(String::from).collect()
                } else {
                    s.split(&*separator).map(str::to_owned).collect()
                }
            }
        }
    };

    let mut items = Vec::with_capacity(parts.len());
    for part in parts {
        let sym = cx.scope.intern(&*part);
        items.push(Value::string(sym.into()));
    }
    let array = Array::with_items(cx.scope, items);
    Ok(Value::Object(cx.scope.register(array)))
}

macro_rules! simple_string_fn {
    ($name:ident, |$s:ident| $body:expr) => {
        pub fn $name(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
            let $s = this_string(&mut cx)?.to_rc(cx.scope);
            let out: String = $body;
            let sym = cx.scope.intern(&*out);
            Ok(Value::string(sym.into()))
        }
    };
}

simple_string_fn!(trim, |s| s.trim().to_owned());
simple_string_fn!(trim_start, |s| s.trim_start().to_owned());
simple_string_fn!(trim_end, |s| s.trim_end().to_owned());
simple_string_fn!(to_lower_case, |s| s.to_lowercase());
simple_string_fn!(to_upper_case, |s| s.to_uppercase());

pub fn repeat(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let count = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)?;
    if count < 0.0 || !count.is_finite() {
        throw!(cx.scope, RangeError, "Invalid count value");
    }
    let out = s.repeat(count as usize);
    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}

fn pad_impl(mut cx: CallContext<'_, '_>, at_start: bool) -> Result<Value, Value> {
    let s = this_string(&mut cx)?;
    let units = s.code_units(cx.scope);
    let target = cx.args.first().unwrap_or_undefined().to_integer_or_infinity(cx.scope)? as usize;
    let filler = match cx.args.get(1) {
        None | Some(Value::Undefined) => " ".to_string(),
        Some(value) => value.to_js_string(cx.scope)?.to_rc(cx.scope).to_string(),
    };

    if target <= units.len() || filler.is_empty() {
        return Ok(Value::string(s));
    }

    let missing = target - units.len();
    let mut pad = String::new();
    while pad.encode_utf16().count() < missing {
        pad.push_str(&filler);
    }
    let pad_units: Vec<u16> = pad.encode_utf16().take(missing).collect();
    let pad = from_code_units(&pad_units);

    let body = from_code_units(&units);
    let out = if at_start {
        format!("{pad}{body}")
    } else {
        format!("{body}{pad}")
    };
    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}

pub fn pad_start(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    pad_impl(cx, true)
}

pub fn pad_end(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    pad_impl(cx, false)
}

pub fn concat(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut out = this_string(&mut cx)?.to_rc(cx.scope).to_string();
    for arg in cx.args.clone() {
        let part = arg.to_js_string(cx.scope)?;
        out.push_str(&part.to_rc(cx.scope));
    }
    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}

pub fn replace(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let s = this_string(&mut cx)?.to_rc(cx.scope);
    let replacement = arg_string(&mut cx, 1)?;

    let out = match cx.args.first() {
        Some(pattern) if pattern.downcast_ref::<RegExp>().is_some() => {
            let regex = pattern.downcast_ref::<RegExp>().unwrap();
            if regex.is_global() {
                regex.regex().replace_all(&s, &*replacement).into_owned()
            } else {
                regex.regex().replace(&s, &*replacement).into_owned()
            }
        }
        Some(pattern) => {
            let pattern = pattern.clone().to_js_string(cx.scope)?.to_rc(cx.scope);
            s.replacen(&*pattern, &replacement, 1)
        }
        None => s.to_string(),
    };

    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}
