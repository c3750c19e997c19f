use std::hash::{Hash, Hasher};

use crate::localscope::LocalScope;
use crate::value::object::Object;
use crate::value::Value;

use super::conversions::{PreferredType, ValueConversion};

/// `===`.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => a == b,
        _ => false,
    }
}

/// `==`, with the coercing cases.
pub fn loose_eq(sc: &mut LocalScope<'_>, a: &Value, b: &Value) -> Result<bool, Value> {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
        (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::Symbol(_), Value::Symbol(_))
        | (Value::Object(_), Value::Object(_)) => Ok(strict_eq(a, b)),
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            Ok(a.to_number(sc)? == b.to_number(sc)?)
        }
        (Value::Boolean(_), _) => {
            let a = Value::number(a.to_number(sc)?);
            loose_eq(sc, &a, b)
        }
        (_, Value::Boolean(_)) => {
            let b = Value::number(b.to_number(sc)?);
            loose_eq(sc, a, &b)
        }
        (Value::Object(_), Value::Number(_) | Value::String(_) | Value::Symbol(_)) => {
            let a = a.to_primitive(sc, PreferredType::Default)?;
            loose_eq(sc, &a, b)
        }
        (Value::Number(_) | Value::String(_) | Value::Symbol(_), Value::Object(_)) => {
            let b = b.to_primitive(sc, PreferredType::Default)?;
            loose_eq(sc, a, &b)
        }
        _ => Ok(false),
    }
}

/// `SameValueZero`: `+0` equals `-0`, and `NaN` equals itself. The key
/// relation for script `Map`/`Set`.
pub fn same_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
        _ => strict_eq(a, b),
    }
}

/// Wraps a value so it can key a hash map under `same_zero` semantics.
#[derive(Debug, Clone)]
pub struct SameZeroKey(pub Value);

impl PartialEq for SameZeroKey {
    fn eq(&self, other: &Self) -> bool {
        same_zero(&self.0, &other.0)
    }
}

impl Eq for SameZeroKey {}

impl Hash for SameZeroKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => state.write_u8(0),
            Value::Null => state.write_u8(1),
            Value::Boolean(b) => {
                state.write_u8(2);
                b.hash(state);
            }
            Value::Number(n) => {
                state.write_u8(3);
                if n.is_nan() {
                    // All NaNs are the same key.
                    state.write_u64(0x7ff8_0000_0000_0000);
                } else {
                    // Normalize -0 to +0.
                    let n = if *n == 0.0 { 0.0 } else { *n };
                    state.write_u64(n.to_bits());
                }
            }
            Value::String(s) => {
                state.write_u8(4);
                s.hash(state);
            }
            Value::Symbol(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Value::Object(o) => {
                state.write_u8(6);
                o.hash(state);
            }
        }
    }
}

/// `instanceof`: walks the prototype chain of `value` looking for the
/// constructor's `.prototype`.
pub fn instance_of(sc: &mut LocalScope<'_>, value: &Value, constructor: &Value) -> Result<bool, Value> {
    use crate::throw;
    use crate::value::Typeof;
    use cinder_middle::interner::sym;

    if !matches!(constructor.type_of(), Typeof::Function) {
        throw!(sc, TypeError, "Right-hand side of 'instanceof' is not callable");
    }

    let target_prototype = constructor.get_property(sc, sym::PROTOTYPE.into())?;
    let Value::Object(target) = target_prototype else {
        return Ok(false);
    };

    let Value::Object(handle) = value else {
        return Ok(false);
    };

    let mut cursor = handle.get_prototype(sc)?;
    while let Value::Object(link) = cursor {
        if link == target {
            return Ok(true);
        }
        cursor = link.get_prototype(sc)?;
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_zero_number_edge_cases() {
        assert!(same_zero(&Value::number(0.0), &Value::number(-0.0)));
        assert!(same_zero(&Value::number(f64::NAN), &Value::number(f64::NAN)));
        assert!(!same_zero(&Value::number(1.0), &Value::number(2.0)));
    }

    #[test]
    fn strict_eq_nan_is_unequal() {
        assert!(!strict_eq(&Value::number(f64::NAN), &Value::number(f64::NAN)));
        assert!(strict_eq(&Value::number(0.0), &Value::number(-0.0)));
    }
}
