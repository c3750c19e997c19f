use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::value::function::{CallContext, NativeFunction};
use crate::value::object::{Handle, NamedObject};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Value, ValueContext};

use super::{register, register_fn};

macro_rules! unary_math_fn {
    ($name:ident, $method:ident) => {
        pub fn $name(cx: CallContext<'_, '_>) -> Result<Value, Value> {
            let n = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
            Ok(Value::number(n.$method()))
        }
    };
}

unary_math_fn!(abs, abs);
unary_math_fn!(floor, floor);
unary_math_fn!(ceil, ceil);
unary_math_fn!(trunc, trunc);
unary_math_fn!(sqrt, sqrt);
unary_math_fn!(cbrt, cbrt);
unary_math_fn!(sin, sin);
unary_math_fn!(cos, cos);
unary_math_fn!(tan, tan);
unary_math_fn!(asin, asin);
unary_math_fn!(acos, acos);
unary_math_fn!(atan, atan);
unary_math_fn!(sinh, sinh);
unary_math_fn!(cosh, cosh);
unary_math_fn!(tanh, tanh);
unary_math_fn!(exp, exp);
unary_math_fn!(ln, ln);
unary_math_fn!(log2, log2);
unary_math_fn!(log10, log10);

pub fn round(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    // Half-way cases round toward positive infinity.
    Ok(Value::number((n + 0.5).floor()))
}

pub fn sign(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let n = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    Ok(Value::number(if n.is_nan() || n == 0.0 { n } else { n.signum() }))
}

pub fn pow(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let base = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    let exponent = cx.args.get(1).unwrap_or_undefined().to_number(cx.scope)?;
    Ok(Value::number(base.powf(exponent)))
}

pub fn atan2(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let y = cx.args.first().unwrap_or_undefined().to_number(cx.scope)?;
    let x = cx.args.get(1).unwrap_or_undefined().to_number(cx.scope)?;
    Ok(Value::number(y.atan2(x)))
}

pub fn min(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut result = f64::INFINITY;
    for arg in cx.args.clone() {
        let n = arg.to_number(cx.scope)?;
        if n.is_nan() {
            return Ok(Value::number(f64::NAN));
        }
        result = result.min(n);
    }
    Ok(Value::number(result))
}

pub fn max(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let mut result = f64::NEG_INFINITY;
    for arg in cx.args.clone() {
        let n = arg.to_number(cx.scope)?;
        if n.is_nan() {
            return Ok(Value::number(f64::NAN));
        }
        result = result.max(n);
    }
    Ok(Value::number(result))
}

pub fn random(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let _ = &cx;
    // A small xorshift seeded from the system time; scripts needing
    // reproducibility should inject their own source through the host.
    use std::cell::Cell;
    use std::time::{SystemTime, UNIX_EPOCH};

    thread_local! {
        static STATE: Cell<u64> = Cell::new(0);
    }

    let value = STATE.with(|state| {
        let mut x = state.get();
        if x == 0 {
            x = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9e3779b97f4a7c15)
                | 1;
        }
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        state.set(x);
        (x >> 11) as f64 / (1u64 << 53) as f64
    });

    Ok(Value::number(value))
}

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let math = sc.register(NamedObject::new(sc));

    for (name, fun) in [
        ("abs", abs as NativeFunction),
        ("floor", floor),
        ("ceil", ceil),
        ("round", round),
        ("trunc", trunc),
        ("sign", sign),
        ("sqrt", sqrt),
        ("cbrt", cbrt),
        ("pow", pow),
        ("min", min),
        ("max", max),
        ("random", random),
        ("sin", sin),
        ("cos", cos),
        ("tan", tan),
        ("asin", asin),
        ("acos", acos),
        ("atan", atan),
        ("atan2", atan2),
        ("sinh", sinh),
        ("cosh", cosh),
        ("tanh", tanh),
        ("exp", exp),
        ("log", ln),
        ("log2", log2),
        ("log10", log10),
    ] {
        let name = sc.intern(name);
        register_fn(sc, &math, name, fun);
    }

    for (name, value) in [
        ("PI", std::f64::consts::PI),
        ("E", std::f64::consts::E),
        ("LN2", std::f64::consts::LN_2),
        ("LN10", std::f64::consts::LN_10),
        ("LOG2E", std::f64::consts::LOG2_E),
        ("LOG10E", std::f64::consts::LOG10_E),
        ("SQRT2", std::f64::consts::SQRT_2),
        ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ] {
        let name = sc.intern(name);
        register(sc, &math, name, Value::number(value));
    }

    register(sc, global, sym::MATH, Value::Object(math));
}
