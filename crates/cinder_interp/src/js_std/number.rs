use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::function::CallContext;
use crate::value::object::Handle;
use crate::value::ops::conversions::{ValueConversion, MAX_SAFE_INTEGERF};
use crate::value::{Value, ValueContext};

use super::{register, register_ctor, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let prototype = sc.statics.number_prototype.clone();
    let to_fixed_sym = sc.intern("toFixed");
    register_fn(sc, &prototype, sym::TO_STRING, to_string);
    register_fn(sc, &prototype, sym::VALUE_OF, value_of);
    register_fn(sc, &prototype, to_fixed_sym, to_fixed);

    let ctor = register_ctor(sc, global, sym::NUMBER, constructor, &prototype);
    for (name, fun) in [
        ("isNaN", is_nan as crate::value::function::NativeFunction),
        ("isFinite", is_finite),
        ("isInteger", is_integer),
        ("isSafeInteger", is_safe_integer),
        ("parseInt", super::global::parse_int),
        ("parseFloat", super::global::parse_float),
    ] {
        let name = sc.intern(name);
        register_fn(sc, &ctor, name, fun);
    }

    for (name, value) in [
        ("MAX_SAFE_INTEGER", MAX_SAFE_INTEGERF),
        ("MIN_SAFE_INTEGER", -MAX_SAFE_INTEGERF),
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("EPSILON", f64::EPSILON),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
        ("NaN", f64::NAN),
    ] {
        let name = sc.intern(name);
        register(sc, &ctor, name, Value::number(value));
    }
}

pub fn constructor(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let value = match cx.args.first() {
        Some(value) => value.to_number(cx.scope)?,
        None => 0.0,
    };
    Ok(Value::number(value))
}

fn this_number(cx: &mut CallContext<'_, '_>) -> Result<f64, Value> {
    let this = cx.this.clone();
    this.to_number(cx.scope)
}

pub fn value_of(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(Value::number(this_number(&mut cx)?))
}

pub fn to_string(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = this_number(&mut cx)?;

    let radix = match cx.args.first() {
        None | Some(Value::Undefined) => 10,
        Some(value) => value.to_int32(cx.scope)?,
    };
    if !(2..=36).contains(&radix) {
        throw!(cx.scope, RangeError, "toString() radix must be between 2 and 36");
    }

    let text = if radix == 10 {
        cinder_middle::util::format_f64(n)
    } else {
        format_radix(n, radix as u32)
    };
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

fn format_radix(n: f64, radix: u32) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }

    let negative = n < 0.0;
    let mut int = n.abs().trunc() as u64;
    let mut digits = Vec::new();
    loop {
        let digit = (int % radix as u64) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap());
        int /= radix as u64;
        if int == 0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }
    digits.into_iter().rev().collect()
}

pub fn to_fixed(mut cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = this_number(&mut cx)?;
    let precision = match cx.args.first() {
        None | Some(Value::Undefined) => 0,
        Some(value) => value.to_int32(cx.scope)?,
    };
    if !(0..=100).contains(&precision) {
        throw!(cx.scope, RangeError, "toFixed() digits argument must be between 0 and 100");
    }
    let text = format!("{:.*}", precision as usize, n);
    let sym = cx.scope.intern(&*text);
    Ok(Value::string(sym.into()))
}

pub fn is_nan(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(Value::boolean(matches!(
        cx.args.first(),
        Some(Value::Number(n)) if n.is_nan()
    )))
}

pub fn is_finite(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(Value::boolean(matches!(
        cx.args.first(),
        Some(Value::Number(n)) if n.is_finite()
    )))
}

pub fn is_integer(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(Value::boolean(matches!(
        cx.args.first(),
        Some(Value::Number(n)) if n.is_finite() && *n == n.trunc()
    )))
}

pub fn is_safe_integer(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    Ok(Value::boolean(matches!(
        cx.args.first(),
        Some(Value::Number(n)) if n.is_finite() && *n == n.trunc() && n.abs() <= MAX_SAFE_INTEGERF
    )))
}
