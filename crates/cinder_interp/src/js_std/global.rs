use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::CallContext;
use crate::value::object::Handle;
use crate::value::ops::conversions::{string_to_number, ValueConversion};
use crate::value::{Value, ValueContext};

use super::{register, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    register(sc, global, sym::NAN, Value::number(f64::NAN));
    register(sc, global, sym::INFINITY, Value::number(f64::INFINITY));
    register(sc, global, sym::UNDEFINED, Value::undefined());

    let parse_int_sym = sc.intern("parseInt");
    let parse_float_sym = sc.intern("parseFloat");
    let is_nan_sym = sc.intern("isNaN");
    let is_finite_sym = sc.intern("isFinite");
    register_fn(sc, global, parse_int_sym, parse_int);
    register_fn(sc, global, parse_float_sym, parse_float);
    register_fn(sc, global, is_nan_sym, is_nan);
    register_fn(sc, global, is_finite_sym, is_finite);
}

pub fn parse_int(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let input = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    let input = input.to_rc(cx.scope);
    let input = input.trim();

    let radix = match cx.args.get(1) {
        Some(radix) => radix.to_int32(cx.scope)?,
        None => 0,
    };

    let (input, sign) = match input.strip_prefix('-') {
        Some(rest) => (rest, -1.0),
        None => (input.strip_prefix('+').unwrap_or(input), 1.0),
    };

    let (input, radix) = if radix == 16 || radix == 0 {
        match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            Some(rest) => (rest, 16),
            None => (input, if radix == 0 { 10 } else { radix }),
        }
    } else {
        (input, radix)
    };

    if !(2..=36).contains(&radix) {
        return Ok(Value::number(f64::NAN));
    }

    // Parse the longest valid digit prefix.
    let mut value = f64::NAN;
    let mut acc = 0.0f64;
    let mut any = false;
    for c in input.chars() {
        match c.to_digit(radix as u32) {
            Some(digit) => {
                acc = acc * radix as f64 + digit as f64;
                any = true;
            }
            None => break,
        }
    }
    if any {
        value = acc * sign;
    }

    Ok(Value::number(value))
}

pub fn parse_float(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let input = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    let input = input.to_rc(cx.scope);
    let input = input.trim();

    // Take the longest prefix that parses as a decimal number.
    let mut end = 0;
    let bytes = input.as_bytes();
    let mut seen_dot = false;
    let mut seen_exp = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => end = i + 1,
            b'+' | b'-' if i == 0 || matches!(bytes.get(i - 1), Some(b'e' | b'E')) => {}
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if !seen_exp && end > 0 => seen_exp = true,
            _ => break,
        }
    }

    if end == 0 {
        if input.starts_with("Infinity") || input.starts_with("+Infinity") {
            return Ok(Value::number(f64::INFINITY));
        }
        if input.starts_with("-Infinity") {
            return Ok(Value::number(f64::NEG_INFINITY));
        }
        return Ok(Value::number(f64::NAN));
    }

    // Only ASCII was accepted, so the slice is on a char boundary.
    Ok(Value::number(string_to_number(&input[..end])))
}

pub fn is_nan(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    Ok(Value::boolean(n.is_nan()))
}

pub fn is_finite(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    Ok(Value::boolean(n.is_finite()))
}
