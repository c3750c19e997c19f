use cinder_middle::util;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::boxed;
use crate::value::object::{Handle, PropertyKey};
use crate::value::string::JsString;
use crate::value::Value;

pub const MAX_SAFE_INTEGERF: f64 = 9007199254740991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

/// The abstract conversion operations, available on every value.
pub trait ValueConversion {
    fn to_primitive(&self, sc: &mut LocalScope<'_>, preferred: PreferredType) -> Result<Value, Value>;
    fn to_number(&self, sc: &mut LocalScope<'_>) -> Result<f64, Value>;
    fn to_boolean(&self, sc: &mut LocalScope<'_>) -> Result<bool, Value>;
    fn to_js_string(&self, sc: &mut LocalScope<'_>) -> Result<JsString, Value>;
    fn to_object(&self, sc: &mut LocalScope<'_>) -> Result<Handle, Value>;
    fn length_of_array_like(&self, sc: &mut LocalScope<'_>) -> Result<usize, Value>;

    fn to_int32(&self, sc: &mut LocalScope<'_>) -> Result<i32, Value> {
        let n = self.to_number(sc)?;
        if !n.is_finite() {
            return Ok(0);
        }
        Ok(n as i64 as i32)
    }

    fn to_uint32(&self, sc: &mut LocalScope<'_>) -> Result<u32, Value> {
        self.to_int32(sc).map(|n| n as u32)
    }

    fn to_integer_or_infinity(&self, sc: &mut LocalScope<'_>) -> Result<f64, Value> {
        let number = self.to_number(sc)?;
        if number.is_nan() || number == 0.0 {
            return Ok(0.0);
        }
        if number.is_infinite() {
            return Ok(number);
        }
        let integer = number.abs().floor();
        Ok(if number < 0.0 { -integer } else { integer })
    }

    fn to_length(&self, sc: &mut LocalScope<'_>) -> Result<f64, Value> {
        let len = self.to_integer_or_infinity(sc)?;
        if len <= 0.0 {
            return Ok(0.0);
        }
        Ok(len.min(MAX_SAFE_INTEGERF))
    }
}

/// Parses a string the way `Number(str)` does.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        return u64::from_str_radix(oct, 8).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => s.parse().unwrap_or(f64::NAN),
    }
}

impl ValueConversion for Value {
    fn to_primitive(&self, sc: &mut LocalScope<'_>, preferred: PreferredType) -> Result<Value, Value> {
        let Value::Object(handle) = self else {
            return Ok(self.clone());
        };

        // A `Symbol.toPrimitive` method wins over the ordinary protocol.
        let to_primitive_sym = sc.statics.symbol_to_primitive.clone();
        let method = self.get_property(sc, PropertyKey::Symbol(to_primitive_sym))?;
        if !method.is_nullish() {
            let hint = match preferred {
                PreferredType::Default => "default",
                PreferredType::String => "string",
                PreferredType::Number => "number",
            };
            let hint = Value::string(sc.intern(hint).into());
            let result = method.apply(sc, self.clone(), vec![hint])?;
            if !matches!(result, Value::Object(_)) {
                return Ok(result);
            }
            throw!(sc, TypeError, "Symbol.toPrimitive must return a primitive value");
        }

        // Boxed primitives shortcut.
        if let Some(inner) = boxed::unbox(handle) {
            return Ok(inner);
        }

        let method_names = match preferred {
            PreferredType::String => [cinder_middle::interner::sym::TO_STRING, cinder_middle::interner::sym::VALUE_OF],
            _ => [cinder_middle::interner::sym::VALUE_OF, cinder_middle::interner::sym::TO_STRING],
        };

        for name in method_names {
            let method = self.get_property(sc, name.into())?;
            if matches!(method.type_of(), crate::value::Typeof::Function) {
                let result = method.apply(sc, self.clone(), Vec::new())?;
                if !matches!(result, Value::Object(_)) {
                    return Ok(result);
                }
            }
        }

        throw!(sc, TypeError, "Cannot convert object to primitive value")
    }

    fn to_number(&self, sc: &mut LocalScope<'_>) -> Result<f64, Value> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(*b as i8 as f64),
            Value::String(s) => Ok(string_to_number(s.res(sc))),
            Value::Symbol(_) => throw!(sc, TypeError, "Cannot convert a Symbol value to a number"),
            Value::Object(_) => {
                let prim = self.to_primitive(sc, PreferredType::Number)?;
                prim.to_number(sc)
            }
        }
    }

    fn to_boolean(&self, sc: &mut LocalScope<'_>) -> Result<bool, Value> {
        Ok(match self {
            Value::Boolean(b) => *b,
            Value::Undefined | Value::Null => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.res_vm(sc).is_empty(),
            Value::Symbol(_) | Value::Object(_) => true,
        })
    }

    fn to_js_string(&self, sc: &mut LocalScope<'_>) -> Result<JsString, Value> {
        match self {
            Value::String(s) => Ok(*s),
            Value::Undefined => Ok(cinder_middle::interner::sym::UNDEFINED.into()),
            Value::Null => Ok(cinder_middle::interner::sym::NULL_LIT.into()),
            Value::Boolean(b) => Ok(if *b {
                cinder_middle::interner::sym::TRUE_LIT.into()
            } else {
                cinder_middle::interner::sym::FALSE_LIT.into()
            }),
            Value::Number(n) => {
                let formatted = util::format_f64(*n);
                Ok(sc.intern(&*formatted).into())
            }
            Value::Symbol(_) => throw!(sc, TypeError, "Cannot convert a Symbol value to a string"),
            Value::Object(_) => {
                let prim = self.to_primitive(sc, PreferredType::String)?;
                prim.to_js_string(sc)
            }
        }
    }

    fn to_object(&self, sc: &mut LocalScope<'_>) -> Result<Handle, Value> {
        match self {
            Value::Object(handle) => Ok(handle.clone()),
            Value::Undefined | Value::Null => {
                throw!(sc, TypeError, "Cannot convert {} to object", self.kind_name())
            }
            other => Ok(boxed::new_boxed(sc, other.clone())),
        }
    }

    fn length_of_array_like(&self, sc: &mut LocalScope<'_>) -> Result<usize, Value> {
        let length = self.get_property(sc, cinder_middle::interner::sym::LENGTH.into())?;
        Ok(length.to_length(sc)? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_number_forms() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x10"), 16.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("12px").is_nan());
    }
}
