use crate::localscope::LocalScope;
use crate::value::Value;

use super::conversions::{PreferredType, ValueConversion};

/// `+`: string concatenation when either primitive is a string, numeric
/// addition otherwise.
pub fn add(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let lprim = left.to_primitive(sc, PreferredType::Default)?;
    let rprim = right.to_primitive(sc, PreferredType::Default)?;

    if matches!(lprim, Value::String(_)) || matches!(rprim, Value::String(_)) {
        let l = lprim.to_js_string(sc)?;
        let r = rprim.to_js_string(sc)?;
        let combined = format!("{}{}", l.to_rc(sc), r.to_rc(sc));
        let sym = sc.intern(&*combined);
        return Ok(Value::string(sym.into()));
    }

    Ok(Value::number(lprim.to_number(sc)? + rprim.to_number(sc)?))
}

pub fn sub(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number(left.to_number(sc)? - right.to_number(sc)?))
}

pub fn mul(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number(left.to_number(sc)? * right.to_number(sc)?))
}

pub fn div(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number(left.to_number(sc)? / right.to_number(sc)?))
}

pub fn rem(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number(left.to_number(sc)? % right.to_number(sc)?))
}

pub fn pow(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number(left.to_number(sc)?.powf(right.to_number(sc)?)))
}

pub fn bitand(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number((left.to_int32(sc)? & right.to_int32(sc)?) as f64))
}

pub fn bitor(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number((left.to_int32(sc)? | right.to_int32(sc)?) as f64))
}

pub fn bitxor(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::number((left.to_int32(sc)? ^ right.to_int32(sc)?) as f64))
}

pub fn shl(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let shift = right.to_uint32(sc)? & 31;
    Ok(Value::number((left.to_int32(sc)? << shift) as f64))
}

pub fn shr(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let shift = right.to_uint32(sc)? & 31;
    Ok(Value::number((left.to_int32(sc)? >> shift) as f64))
}

pub fn ushr(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let shift = right.to_uint32(sc)? & 31;
    Ok(Value::number((left.to_uint32(sc)? >> shift) as f64))
}

pub fn bitnot(sc: &mut LocalScope<'_>, value: &Value) -> Result<Value, Value> {
    Ok(Value::number(!value.to_int32(sc)? as f64))
}

pub fn neg(sc: &mut LocalScope<'_>, value: &Value) -> Result<Value, Value> {
    Ok(Value::number(-value.to_number(sc)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordering {
    Less,
    Greater,
    EqualOrUnordered,
}

/// The abstract relational comparison shared by `<`, `>`, `<=`, `>=`.
fn compare(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Ordering, Value> {
    let lprim = left.to_primitive(sc, PreferredType::Number)?;
    let rprim = right.to_primitive(sc, PreferredType::Number)?;

    if let (Value::String(l), Value::String(r)) = (&lprim, &rprim) {
        let l = l.to_rc(sc);
        let r = r.to_rc(sc);
        return Ok(match l.cmp(&r) {
            std::cmp::Ordering::Less => Ordering::Less,
            std::cmp::Ordering::Greater => Ordering::Greater,
            std::cmp::Ordering::Equal => Ordering::EqualOrUnordered,
        });
    }

    let l = lprim.to_number(sc)?;
    let r = rprim.to_number(sc)?;
    Ok(if l < r {
        Ordering::Less
    } else if l > r {
        Ordering::Greater
    } else {
        Ordering::EqualOrUnordered
    })
}

pub fn lt(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::boolean(compare(sc, left, right)? == Ordering::Less))
}

pub fn gt(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    Ok(Value::boolean(compare(sc, left, right)? == Ordering::Greater))
}

pub fn le(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let lprim = left.to_primitive(sc, PreferredType::Number)?;
    let rprim = right.to_primitive(sc, PreferredType::Number)?;
    if let (Value::String(_), Value::String(_)) = (&lprim, &rprim) {
        return Ok(Value::boolean(compare(sc, &lprim, &rprim)? != Ordering::Greater));
    }
    let l = lprim.to_number(sc)?;
    let r = rprim.to_number(sc)?;
    Ok(Value::boolean(l <= r))
}

pub fn ge(sc: &mut LocalScope<'_>, left: &Value, right: &Value) -> Result<Value, Value> {
    let lprim = left.to_primitive(sc, PreferredType::Number)?;
    let rprim = right.to_primitive(sc, PreferredType::Number)?;
    if let (Value::String(_), Value::String(_)) = (&lprim, &rprim) {
        return Ok(Value::boolean(compare(sc, &lprim, &rprim)? != Ordering::Less));
    }
    let l = lprim.to_number(sc)?;
    let r = rprim.to_number(sc)?;
    Ok(Value::boolean(l >= r))
}
