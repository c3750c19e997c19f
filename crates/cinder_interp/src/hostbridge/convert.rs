use std::rc::Rc;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::Array;
use crate::value::error::{Error, ErrorKind};
use crate::value::object::{Handle, Object};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Typeof, Value};

use super::object::{HostList, HostMap, HostObject};
use super::{HostInstance, HostMethod, HostType, HostValue, MemberRef};

/// No conversion is possible.
pub const CONVERSION_NONE: u32 = 99;
/// A match that needs instance testing rather than ranking (type wrappers,
/// `isInstance` hits).
pub const CONVERSION_NONTRIVIAL: u32 = 0;

/// Orders the numeric primitives by width: `double < float < long < int <
/// short < char < byte`.
fn size_rank(ty: &HostType) -> u32 {
    match ty {
        HostType::Double => 1,
        HostType::Float => 2,
        HostType::Long => 3,
        HostType::Int => 4,
        HostType::Short => 5,
        HostType::Char => 6,
        HostType::Byte => 7,
        _ => 8,
    }
}

fn is_numeric_primitive(ty: &HostType) -> bool {
    ty.is_primitive() && !matches!(ty, HostType::Bool)
}

/// Ranks how "natural" the conversion from a script value to a host type
/// is; lower is better. Follows the LiveConnect 3 preferred-conversion
/// table, with the type-wrapper registry short-circuiting first.
pub fn conversion_weight(sc: &LocalScope<'_>, value: &Value, to: &HostType) -> u32 {
    if sc.host.type_wrappers.lookup(to, value).is_some() {
        return CONVERSION_NONTRIVIAL;
    }

    // A raw-value parameter accepts anything as-is.
    if matches!(to, HostType::Value) {
        return 1;
    }

    match value {
        Value::Undefined => match to {
            HostType::String | HostType::Object => 1,
            _ => CONVERSION_NONE,
        },
        Value::Null => {
            if to.is_primitive() {
                CONVERSION_NONE
            } else {
                1
            }
        }
        Value::Boolean(_) => match to {
            HostType::Bool => 1,
            HostType::Object => 3,
            // Booleans do not silently become text; an explicit String
            // overload never captures a boolean argument.
            _ => CONVERSION_NONE,
        },
        Value::Number(_) => match to {
            HostType::Double => 1,
            ty if is_numeric_primitive(ty) => 1 + size_rank(ty),
            HostType::String => 9,
            HostType::Object => 10,
            _ => CONVERSION_NONE,
        },
        Value::String(_) => match to {
            HostType::String => 1,
            // Any string ranks for `char`; the length-1 requirement is
            // enforced at coercion time.
            HostType::Char => 3,
            ty if is_numeric_primitive(ty) => 4,
            HostType::Object => 2,
            _ => CONVERSION_NONE,
        },
        Value::Symbol(_) => CONVERSION_NONE,
        Value::Object(handle) => {
            // Wrapped host objects rank by instance checks.
            if let Some(host) = handle.as_any().downcast_ref::<HostObject>() {
                return match to {
                    HostType::Class(target) => {
                        if sc.host.registry.is_instance(host.instance.class, *target) {
                            CONVERSION_NONTRIVIAL
                        } else {
                            CONVERSION_NONE
                        }
                    }
                    HostType::Object => 1,
                    HostType::String => 2,
                    ty if is_numeric_primitive(ty) => 2 + size_rank(ty),
                    _ => CONVERSION_NONE,
                };
            }

            let is_function = matches!(handle.type_of(), Typeof::Function);
            let is_array = handle.as_any().is::<Array>() || handle.as_any().is::<HostList>();

            match to {
                HostType::Interface => {
                    if is_function {
                        1
                    } else if !is_array {
                        2
                    } else {
                        12
                    }
                }
                HostType::List(_) | HostType::Array(_) if is_array => 2,
                HostType::Object => 3,
                HostType::String => 4,
                ty if is_numeric_primitive(ty) => 4 + size_rank(ty),
                _ => CONVERSION_NONE,
            }
        }
    }
}

/// Picks the lowest-total-weight overload for an argument tuple. Ties on
/// weight fall back to declaring-class specificity; ties after that raise
/// the ambiguous-call error. No overload being applicable raises too.
pub fn select_overload<'m>(
    sc: &mut LocalScope<'_>,
    name: &str,
    candidates: &[(MemberRef, &'m HostMethod)],
    args: &[Value],
) -> Result<(MemberRef, &'m HostMethod), Value> {
    let mut best: Option<(u32, u32, Vec<(MemberRef, &HostMethod)>)> = None;

    for &(member, method) in candidates {
        if method.params.len() != args.len() {
            continue;
        }

        let mut total = 0u32;
        let mut applicable = true;
        for (arg, param) in args.iter().zip(&method.params) {
            let weight = conversion_weight(sc, arg, param);
            if weight >= CONVERSION_NONE {
                applicable = false;
                break;
            }
            total += weight;
        }
        if !applicable {
            continue;
        }

        match &mut best {
            None => best = Some((total, method.specificity, vec![(member, method)])),
            Some((best_total, best_spec, tied)) => {
                if total < *best_total || (total == *best_total && method.specificity > *best_spec) {
                    *best_total = total;
                    *best_spec = method.specificity;
                    tied.clear();
                    tied.push((member, method));
                } else if total == *best_total && method.specificity == *best_spec {
                    tied.push((member, method));
                }
            }
        }
    }

    match best {
        Some((_, _, tied)) if tied.len() == 1 => Ok(tied[0]),
        Some((_, _, _)) => throw!(
            sc,
            TypeError,
            "The choice of host method {} matching the supplied arguments is ambiguous",
            name
        ),
        None => throw!(sc, TypeError, "Cannot find host method {} matching the supplied arguments", name),
    }
}

/// Applies the resolved conversion at call/set time.
pub fn coerce(sc: &mut LocalScope<'_>, value: &Value, to: &HostType) -> Result<HostValue, Value> {
    if let Some(entry) = sc.host.type_wrappers.lookup(to, value) {
        let wrap = entry.wrap.clone();
        return wrap(sc, value);
    }

    match to {
        HostType::Value => return Ok(HostValue::Value(value.clone())),
        HostType::Bool => {
            if let Value::Boolean(b) = value {
                return Ok(HostValue::Bool(*b));
            }
            return conversion_error(sc, value, to);
        }
        _ => {}
    }

    match value {
        Value::Null => Ok(HostValue::Null),
        Value::Undefined => match to {
            HostType::String => Ok(HostValue::String(Rc::from("undefined"))),
            HostType::Object => Ok(HostValue::Undefined),
            _ => conversion_error(sc, value, to),
        },
        Value::Boolean(b) => match to {
            HostType::Object => Ok(HostValue::Bool(*b)),
            HostType::String => Ok(HostValue::String(Rc::from(if *b { "true" } else { "false" }))),
            _ => conversion_error(sc, value, to),
        },
        Value::Number(_) | Value::String(_) if is_numeric_primitive(to) => {
            let n = match (value, to) {
                (Value::String(s), HostType::Char) => {
                    // A one-character string becomes that character.
                    let text = s.to_rc(sc);
                    let mut chars = text.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        return Ok(HostValue::Char(c));
                    }
                    value.to_number(sc)?
                }
                _ => value.to_number(sc)?,
            };
            Ok(coerce_number(n, to))
        }
        Value::Number(n) => match to {
            HostType::String => {
                let text = cinder_middle::util::format_f64(*n);
                Ok(HostValue::String(Rc::from(&*text)))
            }
            HostType::Object => Ok(HostValue::Double(*n)),
            _ => conversion_error(sc, value, to),
        },
        Value::String(s) => match to {
            HostType::String | HostType::Object => Ok(HostValue::String(s.to_rc(sc))),
            _ => conversion_error(sc, value, to),
        },
        Value::Symbol(_) => conversion_error(sc, value, to),
        Value::Object(handle) => coerce_object(sc, value, handle.clone(), to),
    }
}

fn coerce_object(sc: &mut LocalScope<'_>, value: &Value, handle: Handle, to: &HostType) -> Result<HostValue, Value> {
    // Unwrap host wrappers first: they cross back unchanged.
    if let Some(host) = handle.as_any().downcast_ref::<HostObject>() {
        return match to {
            HostType::Class(target) if sc.host.registry.is_instance(host.instance.class, *target) => {
                Ok(HostValue::Object(host.instance.clone()))
            }
            HostType::Object => Ok(HostValue::Object(host.instance.clone())),
            HostType::String => {
                let text = value.to_js_string(sc)?;
                Ok(HostValue::String(text.to_rc(sc)))
            }
            ty if is_numeric_primitive(ty) => Ok(coerce_number(value.to_number(sc)?, ty)),
            _ => conversion_error(sc, value, to),
        };
    }
    if let Some(list) = handle.as_any().downcast_ref::<HostList>() {
        return Ok(HostValue::List(list.raw().clone()));
    }
    if let Some(map) = handle.as_any().downcast_ref::<HostMap>() {
        return Ok(HostValue::Map(map.raw().clone()));
    }

    match to {
        // Function-shaped (or plain) script objects adapt to interface
        // parameters; calls on the adapter dispatch back into the script.
        HostType::Interface => Ok(HostValue::Delegate(handle)),
        // Script arrays materialize element-wise.
        HostType::List(element) | HostType::Array(element) => {
            let elements = crate::value::array::elements_of(sc, value)?;
            let mut out = Vec::with_capacity(elements.len());
            for element_value in &elements {
                out.push(coerce(sc, element_value, element)?);
            }
            Ok(HostValue::List(Rc::new(std::cell::RefCell::new(out))))
        }
        HostType::Object => Ok(HostValue::Value(value.clone())),
        HostType::String => {
            let text = value.to_js_string(sc)?;
            Ok(HostValue::String(text.to_rc(sc)))
        }
        ty if is_numeric_primitive(ty) => Ok(coerce_number(value.to_number(sc)?, ty)),
        _ => conversion_error(sc, value, to),
    }
}

fn coerce_number(n: f64, to: &HostType) -> HostValue {
    match to {
        HostType::Double => HostValue::Double(n),
        HostType::Float => HostValue::Float(n as f32),
        HostType::Long => HostValue::Long(n as i64),
        HostType::Int => HostValue::Int(n as i64 as i32),
        HostType::Short => HostValue::Short(n as i64 as i16),
        HostType::Byte => HostValue::Byte(n as i64 as i8),
        HostType::Char => HostValue::Char(char::from_u32(n as u32).unwrap_or('\0')),
        _ => HostValue::Double(n),
    }
}

fn conversion_error(sc: &mut LocalScope<'_>, value: &Value, to: &HostType) -> Result<HostValue, Value> {
    throw!(
        sc,
        TypeError,
        "Cannot convert {} to host type {:?}",
        value.kind_name(),
        to
    )
}

/// Turns a host value into a script value through the context's wrap
/// factory.
pub fn wrap_host_value(sc: &mut LocalScope<'_>, value: HostValue) -> Result<Value, Value> {
    if let Some(factory) = sc.host.wrap_factory.clone() {
        return factory.wrap(sc, value);
    }
    default_wrap(sc, value)
}

/// The default host-to-script wrapping rules.
pub fn default_wrap(sc: &mut LocalScope<'_>, value: HostValue) -> Result<Value, Value> {
    Ok(match value {
        HostValue::Null => Value::null(),
        HostValue::Undefined => Value::undefined(),
        HostValue::Bool(b) => Value::boolean(b),
        HostValue::Byte(n) => Value::number(n as f64),
        HostValue::Short(n) => Value::number(n as f64),
        HostValue::Int(n) => Value::number(n as f64),
        HostValue::Long(n) => Value::number(n as f64),
        HostValue::Float(n) => Value::number(n as f64),
        HostValue::Double(n) => Value::number(n),
        HostValue::Char(c) => {
            let sym = sc.interner.intern_char(c);
            Value::string(sym.into())
        }
        HostValue::String(s) => {
            let sym = sc.intern(&*s);
            Value::string(sym.into())
        }
        HostValue::List(list) => {
            let identity = Rc::as_ptr(&list) as *const () as usize;
            if let Some(cached) = sc.host.cached_wrapper(identity) {
                return Ok(Value::Object(cached));
            }
            let wrapper = sc.register(HostList::new(sc, list));
            sc.host.cache_wrapper(identity, &wrapper);
            Value::Object(wrapper)
        }
        HostValue::Map(map) => {
            let identity = Rc::as_ptr(&map) as *const () as usize;
            if let Some(cached) = sc.host.cached_wrapper(identity) {
                return Ok(Value::Object(cached));
            }
            let wrapper = sc.register(HostMap::new(sc, map));
            sc.host.cache_wrapper(identity, &wrapper);
            Value::Object(wrapper)
        }
        HostValue::Object(instance) => {
            let identity = instance.identity();
            if let Some(cached) = sc.host.cached_wrapper(identity) {
                return Ok(Value::Object(cached));
            }
            let wrapper = HostObject::new(sc, instance)?;
            let wrapper = sc.register(wrapper);
            sc.host.cache_wrapper(identity, &wrapper);
            Value::Object(wrapper)
        }
        HostValue::Delegate(handle) => Value::Object(handle),
        HostValue::Value(value) => value,
    })
}

/// Invokes a host method after conversion, wrapping host-side failures
/// into script-catchable errors that keep the original message as cause.
pub fn invoke_host_method(
    sc: &mut LocalScope<'_>,
    method: &HostMethod,
    target: Option<&HostInstance>,
    args: &[Value],
) -> Result<Value, Value> {
    let mut converted = Vec::with_capacity(args.len());
    for (arg, param) in args.iter().zip(&method.params) {
        converted.push(coerce(sc, arg, param)?);
    }

    let invoke = method.invoke.clone();
    let data = target.map(|instance| instance.data.clone());
    let result = invoke(sc, data.as_deref(), converted);

    match result {
        Ok(value) => wrap_host_value(sc, value),
        Err(message) => {
            let cause = {
                let sym = sc.intern(&*message);
                Value::string(sym.into())
            };
            Err(Error::create_with_cause(
                sc,
                ErrorKind::WrappedError,
                message,
                cause,
            ))
        }
    }
}
