use std::rc::Rc;

use cinder_middle::parser::statement::{ObjectPatternField, Pattern, PropertyName};

use crate::frame::Frame;
use crate::localscope::LocalScope;
use crate::value::array::Array;
use crate::value::error::ErrorKind;
use crate::value::iterator;
use crate::value::object::{NamedObject, Object, PropertyKey, PropertyValue};
use crate::value::Value;

use super::exprs::eval_expr;
use super::{init_binding, store_name, throw_error, throw_unwind, Ctx, Unwind};

/// Whether a pattern introduces bindings (declarations, parameters) or
/// assigns to existing ones (destructuring assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindMode {
    Init,
    Assign,
}

pub(crate) fn bind_pattern(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    pattern: &Pattern,
    value: Value,
    mode: BindMode,
) -> Result<(), Unwind> {
    destructure_assign(sc, cx, frame, pattern, value, mode)
}

pub(crate) fn destructure_assign(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    pattern: &Pattern,
    value: Value,
    mode: BindMode,
) -> Result<(), Unwind> {
    match pattern {
        Pattern::Identifier(name) => match mode {
            BindMode::Init => init_binding(sc, cx, frame, *name, value),
            BindMode::Assign => store_name(sc, cx, frame, *name, value),
        },
        Pattern::Array(array) => {
            let elements = iterator::collect_iterable(sc, &value).map_err(|e| throw_unwind(sc, e))?;

            for (index, element) in array.elements.iter().enumerate() {
                let Some(element) = element else { continue };
                let mut item = elements.get(index).cloned().unwrap_or(Value::Undefined);
                if let (Value::Undefined, Some(default)) = (&item, &element.default) {
                    item = eval_expr(sc, cx, frame, default)?;
                }
                destructure_assign(sc, cx, frame, &element.pattern, item, mode)?;
            }

            if let Some(rest) = &array.rest {
                let remaining: Vec<Value> = elements
                    .get(array.elements.len()..)
                    .map(|s| s.to_vec())
                    .unwrap_or_default();
                let rest_array = Array::with_items(sc, remaining);
                let rest_value = Value::Object(sc.register(rest_array));
                destructure_assign(sc, cx, frame, rest, rest_value, mode)?;
            }

            Ok(())
        }
        Pattern::Object(object) => {
            if value.is_nullish() {
                return Err(throw_error(
                    sc,
                    ErrorKind::TypeError,
                    format!("Cannot destructure {}", value.kind_name()),
                ));
            }

            let mut consumed = Vec::with_capacity(object.fields.len());

            for field in &object.fields {
                let ObjectPatternField { key, target, default } = field;
                let key = match key {
                    PropertyName::Static(name) => PropertyKey::String((*name).into()),
                    PropertyName::Computed(expr) => {
                        let key = eval_expr(sc, cx, frame, expr)?;
                        PropertyKey::from_value(sc, key).map_err(|e| throw_unwind(sc, e))?
                    }
                };
                consumed.push(key.clone());

                let mut item = value.get_property(sc, key).map_err(|e| throw_unwind(sc, e))?;
                if let (Value::Undefined, Some(default)) = (&item, default) {
                    item = eval_expr(sc, cx, frame, default)?;
                }

                match target {
                    Some(pattern) => destructure_assign(sc, cx, frame, pattern, item, mode)?,
                    None => {
                        // Shorthand: the key doubles as the binding name.
                        let PropertyName::Static(name) = &field.key else {
                            unreachable!("parser rejects computed shorthand");
                        };
                        destructure_assign(sc, cx, frame, &Pattern::Identifier(*name), item, mode)?;
                    }
                }
            }

            if let Some(rest) = object.rest {
                let rest_object = NamedObject::new(sc);
                if let Value::Object(handle) = &value {
                    let keys = handle.own_keys(sc).map_err(|e| throw_unwind(sc, e))?;
                    for key in keys {
                        let key = PropertyKey::from_value(sc, key).map_err(|e| throw_unwind(sc, e))?;
                        if consumed.contains(&key) {
                            continue;
                        }
                        if let Some(desc) = handle
                            .get_own_property_descriptor(sc, key.clone())
                            .map_err(|e| throw_unwind(sc, e))?
                        {
                            if desc
                                .descriptor
                                .contains(crate::value::object::PropertyDataDescriptor::ENUMERABLE)
                            {
                                let item = desc.get_or_apply(sc, value.clone()).map_err(|e| throw_unwind(sc, e))?;
                                rest_object
                                    .define_own_property(sc, key, PropertyValue::static_default(item))
                                    .map_err(|e| throw_unwind(sc, e))?;
                            }
                        }
                    }
                }
                let rest_value = Value::Object(sc.register(rest_object));
                destructure_assign(sc, cx, frame, &Pattern::Identifier(rest), rest_value, mode)?;
            }

            Ok(())
        }
    }
}
